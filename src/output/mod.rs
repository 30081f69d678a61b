pub mod formatter;

pub use formatter::{
    colors_enabled, format_selection, format_status, format_title, relative_age, ProtocolLine,
    FIELD_DELIMITER,
};
