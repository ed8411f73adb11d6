mod fixtures;

mod cascade_tests;
mod deferred_tests;
mod lifecycle_tests;
mod source_select_tests;
mod validation_tests;
mod variant_tests;
