use std::{env, path::PathBuf, sync::OnceLock};

use eyre::Result;

static CONFIG: OnceLock<Config> = OnceLock::new();

pub struct Config {
    /// Base URL of the statistics service, without a trailing slash.
    pub api_base_url: Box<str>,
    pub output_dir: PathBuf,
    pub history_path: PathBuf,
    pub ranks_path: Option<PathBuf>,
    /// Required only by the group update action.
    pub verification_code: Option<Box<str>>,
    /// Seconds before an in-flight request is abandoned.
    pub fetch_timeout: u64,
}

impl Config {
    pub fn get() -> &'static Self {
        CONFIG.get().expect("CONFIG not yet initialized")
    }
}

pub fn init() -> Result<()> {
    let api_base_url = {
        let mut url = String::from(env_var::<Box<str>>(
            "WOM_API_URL",
            "https://api.wiseoldman.net/v2",
        )?);

        while url.ends_with('/') {
            url.pop();
        }

        url.into_boxed_str()
    };

    let config = Config {
        api_base_url,
        output_dir: env_var("OUTPUT_DIR", "./output")?,
        history_path: env_var("HISTORY_PATH", "./output/ehb_log.csv")?,
        ranks_path: env_var_opt("RANKS_PATH")?,
        verification_code: env_var_opt("GROUP_VERIFICATION_CODE")?,
        fetch_timeout: env_var("FETCH_TIMEOUT_SECS", "30")?,
    };

    CONFIG
        .set(config)
        .map_err(|_| eyre!("`config::init` has already been called"))
}

trait EnvKind: Sized {
    const EXPECTED: &'static str;

    fn from_str(s: String) -> Result<Self, String>;
}

macro_rules! env_kind {
    ($($ty:ty: $arg:ident => $impl:block,)*) => {
        $(
            impl EnvKind for $ty {
                const EXPECTED: &'static str = stringify!($ty);

                fn from_str($arg: String) -> Result<Self, String> {
                    $impl
                }
            }
        )*
    };
}

env_kind! {
    Box<str>: s => { Ok(s.into_boxed_str()) },
    u64: s => { s.parse().map_err(|_| s) },
    PathBuf: s => { Ok(PathBuf::from(s)) },
}

fn parse<T: EnvKind>(name: &'static str, value: String) -> Result<T> {
    T::from_str(value).map_err(|value| {
        eyre!(
            "failed to parse env variable `{name}={value}`; expected {expected}",
            expected = T::EXPECTED
        )
    })
}

/// Reads an env variable, falling back to its documented default.
fn env_var<T: EnvKind>(name: &'static str, default: &str) -> Result<T> {
    match env::var(name) {
        Ok(value) => parse(name, value),
        Err(_) => parse(name, default.to_owned()),
    }
}

fn env_var_opt<T: EnvKind>(name: &'static str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => parse(name, value).map(Some),
        _ => Ok(None),
    }
}
