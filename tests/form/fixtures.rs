use schemaform::prelude::*;
use serde_json::json;

pub fn flows() -> TableResource {
    TableResource {
        tables: vec!["flows".into(), "demands".into()],
        ..TableResource::with_columns(["date", "flow", "demand"])
    }
}

pub fn flows_without_flow() -> TableResource {
    TableResource {
        tables: vec!["flows".into(), "demands".into()],
        ..TableResource::with_columns(["date", "demand"])
    }
}

pub fn loader() -> MemoryLoader {
    MemoryLoader::new()
        .with_table("flows.csv", flows())
        .with_table("flows_v2.csv", flows_without_flow())
}

/// A file producer with a sheet option and a column consumer.
pub fn table_schema() -> FormSchema {
    FormSchema::new().with_title("Inflow").section(
        SectionSchema::new("data")
            .field(FieldSpec::new("url", "file").with_option_fields(["sheet_name"]))
            .field(FieldSpec::new("sheet_name", "table_select").with_source("url"))
            .field(
                FieldSpec::new("column", "column_select")
                    .with_label("Column")
                    .with_source("url"),
            ),
    )
}

/// A constant value or a column of a table, chosen by a source selector.
pub fn parameter_schema() -> FormSchema {
    FormSchema::new().section(
        SectionSchema::new("parameter")
            .field(
                FieldSpec::new("source", "source_select")
                    .with_group("value", ["value"])
                    .with_group("table", ["url", "column"]),
            )
            .field(FieldSpec::new("value", "float").with_default(json!(0)))
            .field(FieldSpec::new("url", "file"))
            .field(FieldSpec::new("column", "column_select").with_source("url")),
    )
}

pub fn timestepper_schema() -> FormSchema {
    FormSchema::new().section(
        SectionSchema::new("timestepper")
            .field(FieldSpec::new("days", "integer").with_default(json!(0)))
            .field(FieldSpec::new("timesteps", "integer").with_default(json!(0)))
            .field(FieldSpec::new("time_delta", "integer").with_default(json!(1)))
            .rule(Rule::exactly_one_of(["days", "timesteps"]))
            .rule(Rule::divisible_by("days", "time_delta")),
    )
}

pub fn options() -> FormOptions {
    FormOptions::default().with_loader(loader())
}
