// sitesync/src/config/mod.rs
use anyhow::{Context, Result};
use globset::GlobMatcher;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::SyncError;

pub const CONFIGURATION_FILE: &str = "_site_sync.json";
pub const CONFIGURATION_FILE_SECRET: &str = "_site_sync_secret.json";
pub const DEFAULT_PRODUCTION_DIRECTORY: &str = "_site";
pub const DEFAULT_INCLUDE_PATTERN: &str = "**/*";
const DEFAULT_REGION: &str = "us-east-1";

const CONFIGURATION_FILE_TEMPLATE: &str = r#"{
  "production_directory": "_site",
  "exclude_files": [],
  "headers": [
    { "pattern": "\\.(css|js)(\\.gz)?$", "header": "Cache-Control", "value": "max-age=31536000" }
  ],
  "campaigns": {}
}
"#;

const CONFIGURATION_FILE_SECRET_TEMPLATE: &str = r#"{
  "s3_id": "YOUR_AWS_S3_ACCESS_KEY_ID",
  "s3_secret": "YOUR_AWS_S3_SECRET_ACCESS_KEY",
  "s3_bucket": "your.blog.bucket.com",
  "cloudfront_distribution_id": ""
}
"#;

// Structs for deserializing the two json files
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHeaderRule {
    pub pattern: String,
    pub header: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCampaign {
    pub include_files: Option<OneOrMany>,
    pub exclude_files: Option<OneOrMany>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSiteConfig {
    pub production_directory: Option<PathBuf>,
    pub exclude_files: Option<OneOrMany>,
    #[serde(default)]
    pub headers: Vec<RawHeaderRule>,
    #[serde(default)]
    pub campaigns: BTreeMap<String, RawCampaign>,
    pub www: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSecretConfig {
    pub s3_id: Option<String>,
    pub s3_secret: Option<String>,
    pub s3_bucket: Option<String>,
    pub cloudfront_distribution_id: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
}

// Application's internal configuration structs
#[derive(Debug, Clone)]
pub struct StoreCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    pub region: String,
    pub endpoint_url: Option<String>,
}

/// A header applied to every file whose storage path matches `pattern`.
#[derive(Debug, Clone)]
pub struct HeaderRule {
    pub pattern: Regex,
    pub header: String,
    pub value: String,
}

/// Include glob kept next to its compiled matcher.
#[derive(Debug, Clone)]
pub struct IncludePattern {
    pub glob: String,
    pub matcher: GlobMatcher,
    /// Segments of `glob` starting with a literal `.`.
    pub dot_segments: Vec<GlobMatcher>,
}

#[derive(Debug, Clone)]
pub struct CampaignConfig {
    pub include_files: Vec<IncludePattern>,
    pub exclude_files: Vec<Regex>,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub credentials: StoreCredentials,
    pub production_directory: PathBuf,
    /// The production directory as configured, used to build the paths header rules see.
    pub production_directory_name: String,
    pub exclude_files: Vec<Regex>,
    pub headers: Vec<HeaderRule>,
    pub campaigns: BTreeMap<String, CampaignConfig>,
    pub cloudfront_distribution_id: Option<String>,
    pub www: Option<String>,
}

impl SyncConfig {
    /// Loads both configuration files from `project_dir`, writing templates
    /// for the ones that are missing.
    pub fn load_from_project(project_dir: &Path) -> Result<Self> {
        let site_path = project_dir.join(CONFIGURATION_FILE);
        let secret_path = project_dir.join(CONFIGURATION_FILE_SECRET);

        ensure_configuration_file(&site_path, CONFIGURATION_FILE_TEMPLATE)?;
        ensure_configuration_file(&secret_path, CONFIGURATION_FILE_SECRET_TEMPLATE)?;

        let raw_site: RawSiteConfig = read_json(&site_path)?;
        let raw_secret: RawSecretConfig = read_json(&secret_path)?;

        let config = Self::from_raw(project_dir, raw_site, raw_secret)?;
        if !config.production_directory.is_dir() {
            return Err(SyncError::NotAProjectDirectory(config.production_directory).into());
        }
        Ok(config)
    }

    pub fn from_raw(
        project_dir: &Path,
        raw_site: RawSiteConfig,
        raw_secret: RawSecretConfig,
    ) -> Result<Self> {
        let credentials = load_credentials(&raw_secret)?;

        let configured_directory = raw_site
            .production_directory
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PRODUCTION_DIRECTORY));
        let production_directory_name = configured_directory
            .to_string_lossy()
            .trim_end_matches('/')
            .to_string();
        let production_directory = project_dir.join(configured_directory);

        let exclude_files = compile_regexes(raw_site.exclude_files, "exclude_files")?;

        let headers = raw_site
            .headers
            .into_iter()
            .map(|rule| {
                Ok(HeaderRule {
                    pattern: compile_regex(&rule.pattern, "headers")?,
                    header: rule.header,
                    value: rule.value,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut campaigns = BTreeMap::new();
        for (name, raw_campaign) in raw_site.campaigns {
            let include_globs = raw_campaign
                .include_files
                .map(OneOrMany::into_vec)
                .unwrap_or_else(|| vec![DEFAULT_INCLUDE_PATTERN.to_string()]);
            let include_files = include_globs
                .into_iter()
                .map(|glob| {
                    IncludePattern::compile(&glob).map_err(|e| {
                        SyncError::ConfigurationMalformed(format!(
                            "campaign '{}' has an invalid include_files glob '{}': {}",
                            name, glob, e
                        ))
                        .into()
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            let exclude_files = compile_regexes(
                raw_campaign.exclude_files,
                &format!("campaigns.{}.exclude_files", name),
            )?;
            campaigns.insert(name, CampaignConfig { include_files, exclude_files });
        }

        Ok(SyncConfig {
            credentials,
            production_directory,
            production_directory_name,
            exclude_files,
            headers,
            campaigns,
            cloudfront_distribution_id: raw_secret
                .cloudfront_distribution_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            www: raw_site.www.filter(|w| !w.trim().is_empty()),
        })
    }

    /// The default include pattern used for full-site deploys.
    pub fn default_include() -> Result<Vec<IncludePattern>> {
        let pattern = IncludePattern::compile(DEFAULT_INCLUDE_PATTERN)
            .context("Failed to compile the default include pattern")?;
        Ok(vec![pattern])
    }
}

fn load_credentials(raw_secret: &RawSecretConfig) -> Result<StoreCredentials> {
    let required = |value: &Option<String>, name: &str| -> Result<String> {
        value
            .as_ref()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                SyncError::ConfigurationMalformed(format!(
                    "{} must be set in {}",
                    name, CONFIGURATION_FILE_SECRET
                ))
                .into()
            })
    };

    Ok(StoreCredentials {
        access_key_id: required(&raw_secret.s3_id, "s3_id")?,
        secret_access_key: required(&raw_secret.s3_secret, "s3_secret")?,
        bucket_name: required(&raw_secret.s3_bucket, "s3_bucket")?,
        region: raw_secret
            .s3_region
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        endpoint_url: raw_secret.s3_endpoint.clone().filter(|e| !e.trim().is_empty()),
    })
}

fn compile_regex(pattern: &str, field: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        SyncError::ConfigurationMalformed(format!(
            "invalid regex '{}' in {}: {}",
            pattern, field, e
        ))
        .into()
    })
}

fn compile_regexes(patterns: Option<OneOrMany>, field: &str) -> Result<Vec<Regex>> {
    patterns
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .iter()
        .map(|p| compile_regex(p, field))
        .collect()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| {
        SyncError::ConfigurationMalformed(format!(
            "failed to parse JSON from {}: {}",
            path.display(),
            e
        ))
        .into()
    })
}

/// Writes `template` to `path` if the file does not exist yet and reports it as missing.
fn ensure_configuration_file(path: &Path, template: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    fs::write(path, template)
        .with_context(|| format!("Failed to write configuration template to {}", path.display()))?;
    Err(SyncError::ConfigurationMissing { path: path.to_path_buf() }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn secret() -> RawSecretConfig {
        serde_json::from_value(json!({
            "s3_id": "id",
            "s3_secret": "secret",
            "s3_bucket": "blog.example.com",
            "cloudfront_distribution_id": "  "
        }))
        .unwrap()
    }

    fn write_json(path: &Path, value: serde_json::Value) -> anyhow::Result<()> {
        fs::write(path, serde_json::to_string_pretty(&value)?)?;
        Ok(())
    }

    #[test]
    fn test_from_raw_defaults() -> anyhow::Result<()> {
        let config = SyncConfig::from_raw(Path::new("/proj"), RawSiteConfig::default(), secret())?;

        assert_eq!(config.production_directory, PathBuf::from("/proj/_site"));
        assert_eq!(config.production_directory_name, "_site");
        assert_eq!(config.credentials.bucket_name, "blog.example.com");
        assert_eq!(config.credentials.region, "us-east-1");
        assert!(config.credentials.endpoint_url.is_none());
        assert!(config.cloudfront_distribution_id.is_none());
        assert!(config.exclude_files.is_empty());
        assert!(config.campaigns.is_empty());
        Ok(())
    }

    #[test]
    fn test_exclude_files_accepts_string_or_list() -> anyhow::Result<()> {
        let single: RawSiteConfig = serde_json::from_value(json!({ "exclude_files": "\\.map$" }))?;
        let list: RawSiteConfig =
            serde_json::from_value(json!({ "exclude_files": ["\\.map$", "^drafts/"] }))?;

        let single = SyncConfig::from_raw(Path::new("."), single, secret())?;
        let list = SyncConfig::from_raw(Path::new("."), list, secret())?;

        assert_eq!(single.exclude_files.len(), 1);
        assert_eq!(list.exclude_files.len(), 2);
        assert!(list.exclude_files[1].is_match("drafts/post.html"));
        Ok(())
    }

    #[test]
    fn test_campaign_defaults_to_all_files() -> anyhow::Result<()> {
        let site: RawSiteConfig = serde_json::from_value(json!({
            "campaigns": {
                "spring": { "exclude_files": "\\.gz$" },
                "landing": { "include_files": ["landing/**/*", "index.html"] }
            }
        }))?;
        let config = SyncConfig::from_raw(Path::new("."), site, secret())?;

        let spring = &config.campaigns["spring"];
        assert_eq!(spring.include_files[0].glob, DEFAULT_INCLUDE_PATTERN);
        assert_eq!(spring.exclude_files.len(), 1);

        let landing = &config.campaigns["landing"];
        assert_eq!(landing.include_files.len(), 2);
        assert!(landing.exclude_files.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_credentials_are_malformed() {
        let mut raw = secret();
        raw.s3_secret = Some(String::new());
        let err = SyncConfig::from_raw(Path::new("."), RawSiteConfig::default(), raw).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::ConfigurationMalformed(msg)) if msg.contains("s3_secret")
        ));
    }

    #[test]
    fn test_invalid_regex_is_malformed() {
        let site: RawSiteConfig = serde_json::from_value(json!({
            "headers": [{ "pattern": "(", "header": "Cache-Control", "value": "no-cache" }]
        }))
        .unwrap();
        let err = SyncConfig::from_raw(Path::new("."), site, secret()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::ConfigurationMalformed(_))
        ));
    }

    #[test]
    fn test_load_writes_templates_when_missing() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let err = SyncConfig::load_from_project(dir.path()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::ConfigurationMissing { .. })
        ));
        let template = fs::read_to_string(dir.path().join(CONFIGURATION_FILE))?;
        let parsed: RawSiteConfig = serde_json::from_str(&template)?;
        assert_eq!(parsed.headers.len(), 1);
        Ok(())
    }

    #[test]
    fn test_load_rejects_missing_production_directory() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write_json(&dir.path().join(CONFIGURATION_FILE), json!({ "production_directory": "public" }))?;
        write_json(
            &dir.path().join(CONFIGURATION_FILE_SECRET),
            json!({ "s3_id": "id", "s3_secret": "s", "s3_bucket": "b" }),
        )?;

        let err = SyncConfig::load_from_project(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::NotAProjectDirectory(p)) if p.ends_with("public")
        ));

        fs::create_dir(dir.path().join("public"))?;
        let config = SyncConfig::load_from_project(dir.path())?;
        assert_eq!(config.production_directory, dir.path().join("public"));
        Ok(())
    }

    #[test]
    fn test_unparseable_json_is_malformed() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(CONFIGURATION_FILE), "{ not json")?;
        fs::write(dir.path().join(CONFIGURATION_FILE_SECRET), "{}")?;

        let err = SyncConfig::load_from_project(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::ConfigurationMalformed(_))
        ));
        Ok(())
    }
}
