// Thin namespace wrapper for API-layer components
pub mod handlers {
    pub use crate::handlers::*;
}

pub mod routes {
    pub use crate::routes::*;
}

pub mod ui {
    pub use crate::ui::*;
}
