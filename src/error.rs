use thiserror::Error;

/// Failures raised while marshaling values between Lua and the native structs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    #[error("wrong number of arguments ({given} for {expected}) to {type_name}")]
    Arity {
        type_name: &'static str,
        given: usize,
        expected: &'static str,
    },

    #[error("can't convert {from} into {to}")]
    Type { from: String, to: &'static str },

    #[error("{value} out of range for {to}")]
    OutOfRange { value: String, to: &'static str },

    #[error("can't modify frozen {0}")]
    Frozen(&'static str),

    #[error("attempt to perform 'n//0'")]
    DivideByZero,
}

impl BindingError {
    pub(crate) fn arity(type_name: &'static str, given: usize, expected: &'static str) -> Self {
        Self::Arity {
            type_name,
            given,
            expected,
        }
    }

    pub(crate) fn type_error(from: impl Into<String>, to: &'static str) -> Self {
        Self::Type {
            from: from.into(),
            to,
        }
    }
}

impl From<BindingError> for mlua::Error {
    fn from(err: BindingError) -> Self {
        mlua::Error::external(err)
    }
}
