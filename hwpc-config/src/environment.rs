use std::env;
use std::fmt;
use std::io;

/// Environment variable selecting the runtime environment.
const APP_ENVIRONMENT: &str = "APP_ENVIRONMENT";

/// The runtime environment the application runs in.
///
/// Selects which environment-specific configuration file is loaded and how tracing
/// output is formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }

    /// Loads the environment from `APP_ENVIRONMENT`, defaulting to [`Environment::Dev`]
    /// when unset.
    pub fn load() -> io::Result<Self> {
        match env::var(APP_ENVIRONMENT) {
            Ok(value) => value
                .try_into()
                .map_err(|err: String| io::Error::new(io::ErrorKind::InvalidInput, err)),
            Err(env::VarError::NotPresent) => Ok(Environment::Dev),
            Err(err) => Err(io::Error::new(io::ErrorKind::InvalidInput, err)),
        }
    }

    /// Exports this environment into `APP_ENVIRONMENT` for child configuration loads.
    pub fn set(&self) {
        unsafe {
            env::set_var(APP_ENVIRONMENT, self.as_str());
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            other => Err(format!(
                "`{other}` is not a supported environment, use `dev` or `prod`"
            )),
        }
    }
}
