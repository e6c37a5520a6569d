use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("object '{0}' already exists")]
    DuplicateObject(String),
    #[error("attribute '{0}' already exists")]
    DuplicateAttribute(String),
    #[error("unknown object '{0}'")]
    UnknownObject(String),
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),
    #[error("object '{object}' references unknown attribute '{attribute}'")]
    DanglingIncidence { object: String, attribute: String },
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, ModelError>;
