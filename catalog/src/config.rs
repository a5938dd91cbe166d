use crate::controller::RefreshPolicy;
use crate::error::CatalogError;
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tablestore::config::StoreConfiguration;
use url::Url;

/// Application configuration struct
/// Holds the data we need to connect to the hosted store plus the catalog
/// layout: category set, flag quotas and the refresh policy.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct AppConfiguration {
    pub store: StoreConfiguration,

    /// This will ensure the section is populated with defaults, even if the
    /// Toml file is an old version which does not have a `catalog` section
    #[serde(default = "default_catalog_data")]
    pub catalog: CatalogData,
}

impl Default for AppConfiguration {
    fn default() -> Self {
        AppConfiguration {
            store: StoreConfiguration {
                // Local development endpoint of the hosted store
                url: "http://localhost:54321".to_string(),
                api_key: String::new(),
            },
            catalog: CatalogData::default(),
        }
    }
}

/// The `catalog` section of the Toml file.
///
/// Category and flag sets are configuration data rather than constants so
/// that schema drift (new categories, new per-category flags) is absorbed by
/// editing the file, not the code.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct CatalogData {
    /// Storage bucket receiving uploaded images.
    #[serde(default = "default_image_bucket")]
    pub image_bucket: String,

    #[serde(default)]
    pub refresh: RefreshPolicy,

    /// Ordered category set; partitions are rendered in this order.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategorySpec>,

    /// Per-category caps on boolean flags. A flag missing here is uncapped.
    #[serde(default = "default_quotas")]
    pub quotas: Vec<FlagQuota>,
}

impl Default for CatalogData {
    fn default() -> Self {
        CatalogData {
            image_bucket: default_image_bucket(),
            refresh: RefreshPolicy::default(),
            categories: default_categories(),
            quotas: default_quotas(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct CategorySpec {
    pub key: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct FlagQuota {
    pub flag: String,
    pub per_category_limit: usize,
}

/// Filename holding the application configuration parameters
#[must_use]
pub fn configuration_file() -> PathBuf {
    project_dirs().preference_dir().into()
}

#[allow(clippy::missing_errors_doc)]
pub fn load() -> Result<AppConfiguration, CatalogError> {
    let config_path = configuration_file();
    let app_config = read(&config_path)?;

    // Catch a malformed endpoint here rather than on the first request
    Url::parse(&app_config.store.url)?;
    Ok(app_config)
}

#[allow(clippy::missing_errors_doc)]
pub fn save(cfg: &AppConfiguration) -> Result<()> {
    create_configuration_file(cfg, &configuration_file())
}

#[allow(clippy::missing_errors_doc)]
pub fn application_config_to_string(cfg: &AppConfiguration) -> Result<String> {
    Ok(toml::to_string::<AppConfiguration>(cfg)?)
}

fn default_catalog_data() -> CatalogData {
    CatalogData::default()
}

fn default_image_bucket() -> String {
    "blog-images".to_string()
}

fn default_categories() -> Vec<CategorySpec> {
    let spec = |key: &str, subs: &[&str]| CategorySpec {
        key: key.to_string(),
        subcategories: subs.iter().map(ToString::to_string).collect(),
    };
    vec![
        spec("TECH", &["Tech Deals", "News"]),
        spec("GAMES", &["PS5", "Xbox", "Nintendo", "PC"]),
        spec("ENTERTAINMENT", &["Movies", "Series", "Comics"]),
        spec("STOCKS", &["Market News", "Analysis", "IPO", "Crypto"]),
        spec("GADGETS", &["MOBILE", "LAPTOPS"]),
    ]
}

fn default_quotas() -> Vec<FlagQuota> {
    vec![FlagQuota {
        flag: "featured".to_string(),
        per_category_limit: 7,
    }]
}

fn project_dirs() -> ProjectDirs {
    ProjectDirs::from("com", "pressroom", "catalog")
        .expect("Unable to determine the name of the 'project_dirs' directory name")
}

/// Reads the `AppConfiguration` struct from the supplied TOML file
fn read(path: &Path) -> Result<AppConfiguration, CatalogError> {
    let mut file = File::open(path).map_err(|source| CatalogError::ApplicationConfig {
        path: path.into(),
        source,
    })?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|source| CatalogError::ApplicationConfig {
            path: path.into(),
            source,
        })?;
    toml::from_str::<AppConfiguration>(&contents).map_err(|source| CatalogError::TomlParse {
        path: path.into(),
        source,
    })
}

fn create_configuration_file(cfg: &AppConfiguration, path: &PathBuf) -> Result<()> {
    let directory = path.parent().unwrap();
    if !directory.try_exists()? {
        fs::create_dir_all(directory)?;
    }

    let mut file = File::create(path)?;
    file.write_all(application_config_to_string(cfg)?.as_bytes())?;
    Ok(())
}
