#![forbid(unsafe_code)]

//! Form orchestration and validators.

pub mod forms;
pub mod validation;

pub use forms::{
    FieldConfig, FieldHandle, FieldInput, FieldState, FormConfig, FormError, FormOrchestrator,
    FormSnapshot, FormValue, InputBinding, SubmitResult,
};
pub use validation::{AsyncValidator, Validator, ValidatorFailure};
