mod reload;

pub use reload::{reload_in_background, TemplateReloadTask};
