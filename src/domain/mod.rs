mod resource;
mod rules;
mod schema;
mod spec;
mod validators;

pub use resource::{ResourceRequest, TableResource};
pub use rules::{Filter, FilterFn, Rule, RuleFn, RuleViolation};
pub use schema::{CascadeAction, Condition, EdgeSpec, FormSchema, SectionSchema, VariantSet};
pub use spec::{Constraints, FieldSpec};
pub use validators::{ValidationResult, Validator, ValidatorFn, is_blank};
pub(crate) use validators::{check_range, check_unique};
