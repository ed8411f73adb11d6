mod base;
mod bool;
mod column_select;
mod enum_select;
mod file_source;
mod index_select;
mod number;
mod points;
mod registry;
mod scalar_array;
mod text;

pub use base::{ComponentKind, FieldComponent, FieldComponentClone};
pub use bool::BoolComponent;
pub use column_select::ColumnSelectComponent;
pub use enum_select::EnumComponent;
pub use file_source::FileSourceComponent;
pub use index_select::IndexSelectComponent;
pub use number::NumberComponent;
pub use points::PointsComponent;
pub use registry::{ComponentFactory, ComponentRegistry};
pub use scalar_array::ScalarArrayComponent;
pub use text::TextComponent;

/// Kind strings of the built-in components.
pub mod kinds {
    pub const TEXT: &str = "text";
    pub const BOOLEAN: &str = "boolean";
    pub const INTEGER: &str = "integer";
    pub const FLOAT: &str = "float";
    pub const CHOICE: &str = "choice";
    pub const NUMBER_LIST: &str = "number_list";
    pub const TEXT_LIST: &str = "text_list";
    pub const POINTS: &str = "points";
    pub const SOURCE_SELECT: &str = "source_select";
    pub const FILE: &str = "file";
    pub const TABLE_SELECT: &str = "table_select";
    pub const COLUMN_SELECT: &str = "column_select";
    pub const INDEX_SELECT: &str = "index_select";
    pub const TYPE_SELECT: &str = "type_select";

    pub const ALL: &[&str] = &[
        TEXT,
        BOOLEAN,
        INTEGER,
        FLOAT,
        CHOICE,
        NUMBER_LIST,
        TEXT_LIST,
        POINTS,
        SOURCE_SELECT,
        FILE,
        TABLE_SELECT,
        COLUMN_SELECT,
        INDEX_SELECT,
        TYPE_SELECT,
    ];
}
