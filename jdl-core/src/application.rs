//! Application configuration
//!
//! A [`JdlApplication`] is an ordered option map laid over the full default
//! table. Construction derives the package name/folder pair and draws the
//! authentication secrets from an injected random source; after that the
//! application is read-only.

use crate::error::ApplicationErrorCase;
use indexmap::IndexMap;
use rand::CryptoRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of random bytes behind each generated secret.
const SECRET_BYTES: usize = 20;

pub const BASE_NAME: &str = "baseName";
pub const PACKAGE_NAME: &str = "packageName";
pub const PACKAGE_FOLDER: &str = "packageFolder";
pub const AUTHENTICATION_TYPE: &str = "authenticationType";
pub const APPLICATION_TYPE: &str = "applicationType";
pub const DATABASE_TYPE: &str = "databaseType";
pub const LANGUAGES: &str = "languages";
pub const TEST_FRAMEWORKS: &str = "testFrameworks";
pub const REMEMBER_ME_KEY: &str = "rememberMeKey";
pub const JWT_SECRET_KEY: &str = "jwtSecretKey";

/// A single option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Text(String),
    /// Ordered set of names.
    List(Vec<String>),
}

impl OptionValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !list.contains(&value) {
                list.push(value);
            }
        }
        Self::List(list)
    }

    /// Whether the value counts as present: null, `false`, `0` and the empty
    /// string are absent, lists always count.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::Text(s) => !s.is_empty(),
            Self::List(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether rendering should omit this value after the option name.
    fn renders_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::List(values) => values.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
            Self::List(values) => f.write_str(&values.join(", ")),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Insertion-ordered map of option name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationConfig(IndexMap<String, OptionValue>);

impl ApplicationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a raw option map, e.g. `{"baseName": "store", "serverPort": 8081}`.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn get(&self, option: &str) -> Option<&OptionValue> {
        self.0.get(option)
    }

    pub fn get_str(&self, option: &str) -> Option<&str> {
        self.get(option).and_then(OptionValue::as_str)
    }

    /// Set an option. Replacing an existing option keeps its position.
    pub fn insert(&mut self, option: impl Into<String>, value: impl Into<OptionValue>) {
        self.0.insert(option.into(), value.into());
    }

    pub fn with(mut self, option: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(option, value);
        self
    }

    pub fn remove(&mut self, option: &str) -> Option<OptionValue> {
        self.0.shift_remove(option)
    }

    pub fn contains(&self, option: &str) -> bool {
        self.0.contains_key(option)
    }

    pub fn is_truthy(&self, option: &str) -> bool {
        self.get(option).is_some_and(OptionValue::is_truthy)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for ApplicationConfig {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut config = Self::new();
        for (option, value) in iter {
            config.insert(option, value);
        }
        config
    }
}

impl IntoIterator for ApplicationConfig {
    type Item = (String, OptionValue);
    type IntoIter = indexmap::map::IntoIter<String, OptionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The full default option table, in rendering order.
pub fn defaults() -> ApplicationConfig {
    let mut config = ApplicationConfig::new();
    config.insert(BASE_NAME, "jhipster");
    config.insert("path", "jhipster");
    config.insert(PACKAGE_NAME, "com.mycompany.myapp");
    config.insert(PACKAGE_FOLDER, "com/mycompany/myapp");
    config.insert(AUTHENTICATION_TYPE, "jwt");
    config.insert("hibernateCache", "no");
    config.insert("clusteredHttpSession", "no");
    config.insert("websocket", false);
    config.insert(DATABASE_TYPE, "sql");
    config.insert("devDatabaseType", "h2Memory");
    config.insert("prodDatabaseType", "mysql");
    config.insert("useCompass", false);
    config.insert("buildTool", "maven");
    config.insert("searchEngine", false);
    config.insert("enableTranslation", true);
    config.insert(APPLICATION_TYPE, "monolith");
    config.insert(TEST_FRAMEWORKS, OptionValue::List(Vec::new()));
    config.insert(LANGUAGES, OptionValue::list(["en"]));
    config.insert("serverPort", 8080);
    config.insert("enableSocialSignIn", false);
    config.insert("enableSwaggerCodegen", false);
    config.insert("useSass", false);
    config.insert("jhiPrefix", "jhi");
    config.insert("messageBroker", false);
    config.insert("serviceDiscoveryType", false);
    config.insert("clientPackageManager", "yarn");
    config.insert("clientFramework", "angular1");
    config.insert("nativeLanguage", "en");
    config.insert("frontEndBuilder", OptionValue::Null);
    config.insert("skipUserManagement", false);
    config.insert("skipClient", false);
    config.insert("skipServer", false);
    config
}

/// A configured application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JdlApplication {
    config: ApplicationConfig,
}

impl JdlApplication {
    /// Build an application, drawing secrets from the thread-local CSPRNG.
    pub fn new(options: ApplicationConfig) -> Self {
        Self::with_rng(options, &mut rand::rng())
    }

    /// Build an application, drawing secrets from `rng`.
    ///
    /// `rememberMeKey` is generated for session authentication, `jwtSecretKey`
    /// for JWT authentication or microservices. Either, both or neither may apply.
    pub fn with_rng<R: CryptoRng + ?Sized>(options: ApplicationConfig, rng: &mut R) -> Self {
        let mut config = merge(options);

        let authentication = config.get_str(AUTHENTICATION_TYPE).map(str::to_string);
        let is_microservice = config.get_str(APPLICATION_TYPE) == Some("microservice");

        if authentication.as_deref() == Some("session") {
            tracing::trace!("generating remember-me key");
            config.insert(REMEMBER_ME_KEY, generate_secret(rng));
        }
        if authentication.as_deref() == Some("jwt") || is_microservice {
            tracing::trace!("generating JWT secret key");
            config.insert(JWT_SECRET_KEY, generate_secret(rng));
        }

        Self { config }
    }

    /// Wrap an option map as-is: no defaults, no derivation, no secrets.
    ///
    /// Meant for checking configurations assembled elsewhere.
    pub fn from_raw_config(config: ApplicationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    pub fn base_name(&self) -> Option<&str> {
        self.config.get_str(BASE_NAME)
    }

    pub fn database_type(&self) -> Option<&str> {
        self.config.get_str(DATABASE_TYPE)
    }

    pub fn remember_me_key(&self) -> Option<&str> {
        self.config.get_str(REMEMBER_ME_KEY)
    }

    pub fn jwt_secret_key(&self) -> Option<&str> {
        self.config.get_str(JWT_SECRET_KEY)
    }

    /// See [`check_validity`].
    pub fn check_validity(&self) -> Vec<ApplicationErrorCase> {
        check_validity(Some(self))
    }

    pub fn is_valid(&self) -> bool {
        is_valid(Some(self))
    }
}

impl fmt::Display for JdlApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "application {{")?;
        writeln!(f, "  config {{")?;
        for (option, value) in self.config.iter() {
            if value.renders_empty() {
                writeln!(f, "    {}", option)?;
            } else {
                writeln!(f, "    {} {}", option, value)?;
            }
        }
        writeln!(f, "  }}")?;
        write!(f, "}}")
    }
}

fn generate_secret<R: CryptoRng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn merge(mut options: ApplicationConfig) -> ApplicationConfig {
    if !options.is_truthy(PACKAGE_NAME) {
        if let Some(folder) = options.get_str(PACKAGE_FOLDER).filter(|f| !f.is_empty()) {
            let name = folder.replace('/', ".");
            options.insert(PACKAGE_NAME, name);
        }
    }
    if !options.is_truthy(PACKAGE_FOLDER) {
        if let Some(name) = options.get_str(PACKAGE_NAME).filter(|n| !n.is_empty()) {
            let folder = name.replace('.', "/");
            options.insert(PACKAGE_FOLDER, folder);
        }
    }

    let mut merged = defaults();
    for (option, value) in options {
        let value = match (option.as_str(), value) {
            (LANGUAGES | TEST_FRAMEWORKS, OptionValue::Text(single)) => OptionValue::list([single]),
            (LANGUAGES | TEST_FRAMEWORKS, OptionValue::List(values)) => OptionValue::list(values),
            (_, value) => value,
        };
        merged.insert(option, value);
    }
    merged
}

/// Every violated requirement of an application, in a fixed order.
///
/// A missing application short-circuits to `[NoApplication]`; otherwise all
/// checks run and every failure is reported.
pub fn check_validity(application: Option<&JdlApplication>) -> Vec<ApplicationErrorCase> {
    let Some(application) = application else {
        return vec![ApplicationErrorCase::NoApplication];
    };
    let config = &application.config;
    let mut errors = Vec::new();

    if !config.is_truthy(BASE_NAME) {
        errors.push(ApplicationErrorCase::NoName);
    }
    if !config.is_truthy(PACKAGE_NAME) || !config.is_truthy(PACKAGE_FOLDER) {
        errors.push(ApplicationErrorCase::NoPackageNameOrFolder);
    }
    if !config.is_truthy(AUTHENTICATION_TYPE) {
        errors.push(ApplicationErrorCase::NoAuthenticationType);
    }
    if !config.is_truthy("hibernateCache") {
        errors.push(ApplicationErrorCase::NoHibernateCache);
    }
    if !config.is_truthy(DATABASE_TYPE) {
        errors.push(ApplicationErrorCase::NoDatabaseType);
    }
    if !config.is_truthy("devDatabaseType") {
        errors.push(ApplicationErrorCase::NoDevDatabaseType);
    }
    if !config.is_truthy("prodDatabaseType") {
        errors.push(ApplicationErrorCase::NoProdDatabaseType);
    }
    if !config.is_truthy("buildTool") {
        errors.push(ApplicationErrorCase::NoBuildTool);
    }
    if !config.is_truthy(APPLICATION_TYPE) {
        errors.push(ApplicationErrorCase::NoApplicationType);
    }
    if !config.is_truthy("clientFramework") {
        errors.push(ApplicationErrorCase::NoClientFramework);
    }
    if config.is_truthy("enableTranslation") && !config.is_truthy("nativeLanguage") {
        errors.push(ApplicationErrorCase::NoChosenLanguage);
    }

    errors
}

pub fn is_valid(application: Option<&JdlApplication>) -> bool {
    check_validity(application).is_empty()
}
