//! Single-page form served at `/`.
//!
//! The page only talks to the JSON API: it submits the selection, renders
//! the profile table with any warnings, keeps the returned mailbox credential
//! for inbox polling, and downloads the CSV export.

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};

const FORM_HTML: &str = r#"<!DOCTYPE html>
<html lang="it">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Generatore di profili fittizi</title>
    <style>
        body { font-family: sans-serif; margin: 2rem; max-width: 1100px; }
        fieldset { margin-bottom: 1rem; }
        table { border-collapse: collapse; width: 100%; margin-top: 1rem; }
        th, td { border: 1px solid #ccc; padding: 4px 8px; font-size: 0.9rem; }
        .warning { background: #fff4ce; padding: 6px; margin: 4px 0; }
        .message { border: 1px solid #ddd; margin: 8px 0; padding: 8px; }
        .hidden { display: none; }
    </style>
</head>
<body>
    <h1>Generatore di profili fittizi</h1>
    <form id="form">
        <fieldset>
            <label>Paese
                <select name="country">
                    <option value="IT">Italia</option>
                    <option value="FR">Francia</option>
                    <option value="DE">Germania</option>
                    <option value="LU">Lussemburgo</option>
                </select>
            </label>
            <label>Numero di profili
                <input type="number" name="count" min="1" max="25" value="1">
            </label>
        </fieldset>
        <fieldset>
            <legend>Campi aggiuntivi</legend>
            <label><input type="checkbox" name="fields" value="email"> Email</label>
            <label><input type="checkbox" name="fields" value="phone"> Telefono</label>
            <label><input type="checkbox" name="fields" value="tax_code"> Codice Fiscale</label>
            <label><input type="checkbox" name="fields" value="vat_id"> Partita IVA</label>
        </fieldset>
        <fieldset id="mail-options" class="hidden">
            <label>Provider
                <select name="provider" id="provider"></select>
            </label>
            <label id="domain-label" class="hidden">Dominio
                <select name="domain" id="domain"></select>
            </label>
        </fieldset>
        <button type="submit">Genera</button>
        <button type="button" id="csv" disabled>Scarica CSV</button>
    </form>

    <div id="warnings"></div>
    <div id="result"></div>
    <div id="inbox-panel" class="hidden">
        <h2>Inbox <span id="inbox-address"></span></h2>
        <button type="button" id="refresh">Aggiorna inbox</button>
        <div id="inbox"></div>
    </div>

    <script>
        const form = document.getElementById('form');
        let mailbox = null;
        let lastBatch = null;

        function request() {
            const data = new FormData(form);
            const body = {
                country: data.get('country'),
                count: Number(data.get('count')),
                fields: data.getAll('fields'),
                provider: data.get('provider') || 'guerrillamail',
            };
            if (body.provider === 'mailtm' && data.get('domain')) {
                body.domain = data.get('domain');
            }
            return body;
        }

        function text(tag, value) {
            const el = document.createElement(tag);
            el.textContent = value;
            return el;
        }

        function showWarnings(list) {
            const box = document.getElementById('warnings');
            box.replaceChildren(...(list || []).map(w => {
                const el = text('div', w);
                el.className = 'warning';
                return el;
            }));
        }

        async function loadProviders() {
            const providers = await (await fetch('/api/v1/providers')).json();
            const select = document.getElementById('provider');
            select.replaceChildren(...providers.map(p => {
                const opt = text('option', p.name);
                opt.value = p.slug;
                return opt;
            }));
        }

        async function loadDomains() {
            const res = await (await fetch('/api/v1/providers/mailtm/domains')).json();
            const select = document.getElementById('domain');
            select.replaceChildren(...res.domains.map(d => {
                const opt = text('option', d);
                opt.value = d;
                return opt;
            }));
            if (res.warning) showWarnings([res.warning]);
        }

        form.addEventListener('change', async (e) => {
            const emailChecked = form.querySelector('input[value="email"]').checked;
            document.getElementById('mail-options').classList.toggle('hidden', !emailChecked);
            const isMailTm = document.getElementById('provider').value === 'mailtm';
            document.getElementById('domain-label').classList.toggle('hidden', !(emailChecked && isMailTm));
            if (e.target.id === 'provider' && isMailTm) await loadDomains();
        });

        form.addEventListener('submit', async (e) => {
            e.preventDefault();
            const req = request();
            const res = await fetch('/api/v1/profiles', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify(req),
            });
            const body = await res.json();
            if (!res.ok) {
                showWarnings([body.error || 'Errore']);
                return;
            }
            showWarnings(body.warnings);
            lastBatch = { fields: req.fields, profiles: body.profiles };
            document.getElementById('csv').disabled = false;

            const table = document.createElement('table');
            const head = table.insertRow();
            body.columns.forEach(c => head.appendChild(text('th', c)));
            const keys = ['first_name', 'last_name', 'birth_date', 'address', 'iban', 'country'];
            const extras = { 'Email': 'email', 'Telefono': 'phone', 'Codice Fiscale': 'tax_code', 'Partita IVA': 'vat_id' };
            body.columns.slice(keys.length).forEach(c => keys.push(extras[c]));
            body.profiles.forEach(p => {
                const row = table.insertRow();
                keys.forEach(k => row.appendChild(text('td', p[k] ?? '')));
            });
            document.getElementById('result').replaceChildren(table);

            mailbox = body.mailbox || null;
            document.getElementById('inbox-panel').classList.toggle('hidden', !mailbox);
            if (mailbox) {
                document.getElementById('inbox-address').textContent = mailbox.address;
                document.getElementById('inbox').replaceChildren();
            }
        });

        document.getElementById('refresh').addEventListener('click', async () => {
            if (!mailbox) return;
            const res = await fetch('/api/v1/inbox', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify(mailbox),
            });
            const inbox = await res.json();
            const panel = document.getElementById('inbox');
            if (!res.ok) {
                panel.replaceChildren(text('p', inbox.error || 'Errore'));
                return;
            }
            const items = inbox.messages.map(m => {
                const div = document.createElement('div');
                div.className = 'message';
                div.appendChild(text('strong', m.subject || '(senza oggetto)'));
                div.appendChild(text('div', 'Da: ' + m.from + ' - ' + m.received_at));
                if (m.body && m.body.kind === 'html') {
                    const frame = document.createElement('iframe');
                    frame.setAttribute('sandbox', '');
                    frame.srcdoc = m.body.content;
                    frame.style.width = '100%';
                    div.appendChild(frame);
                } else if (m.body) {
                    div.appendChild(text('pre', m.body.content));
                }
                return div;
            });
            if (inbox.notice) items.unshift(text('p', inbox.notice));
            panel.replaceChildren(...items);
        });

        document.getElementById('csv').addEventListener('click', async () => {
            // Export the rows on screen, never a fresh batch.
            if (!lastBatch) return;
            const res = await fetch('/api/v1/profiles/export', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify(lastBatch),
            });
            if (!res.ok) {
                const body = await res.json();
                showWarnings([body.error || 'Errore']);
                return;
            }
            const url = URL.createObjectURL(await res.blob());
            const a = document.createElement('a');
            a.href = url;
            a.download = 'profili.csv';
            a.click();
            URL.revokeObjectURL(url);
        });

        loadProviders();
    </script>
</body>
</html>
"#;

/// GET /
pub async fn form_page() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        FORM_HTML,
    )
}
