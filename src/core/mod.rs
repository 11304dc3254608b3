// Domain-layer modules and shared errors/models
pub mod generation {
    pub use crate::generation::*;
}

pub mod generator {
    pub use crate::generator::*;
}

pub mod iban {
    pub use crate::iban::*;
}

pub mod tax_codes {
    pub use crate::tax_codes::*;
}

pub mod export {
    pub use crate::export::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
