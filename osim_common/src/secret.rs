use std::{
    fmt,
    fmt::{Debug, Display},
};

/// A value that is masked whenever it is formatted. Use [`Secret::reveal`] at the single point where the real value is
/// needed (e.g. when building an `Authorization` header).
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl Secret<String> {
    /// Reads the secret from the given environment variable. Unset and blank values both yield `None`.
    pub fn from_env(name: &str) -> Option<Self> {
        std::env::var(name).ok().filter(|s| !s.trim().is_empty()).map(|s| Self::new(s.trim().to_string()))
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
