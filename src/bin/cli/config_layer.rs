//! Configuration Layer Management
//!
//! Defaults, then the configuration file, then CLI overrides.

use std::path::PathBuf;

use crate::cli::args::InlineArgs;
use envinline::{AbsentVariables, InlinerConfig, NameListInput};

/// Trait for merging configuration layers
pub trait ConfigMerge<T> {
    /// Merge another configuration into this one, with the other taking priority
    fn merge_with(&mut self, other: T);
}

/// Convert CLI arguments to partial configuration overrides
pub trait FromCliArgs<T> {
    /// Create a partial configuration from CLI arguments
    fn from_cli_args(args: &T) -> Self;
}

/// Settings given explicitly on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub functions_src: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub inline_all: bool,
    pub include: Option<NameListInput>,
    pub exclude: Option<NameListInput>,
    pub max_concurrency: Option<usize>,
    pub cancel_on_failure: bool,
    pub absent_variables: Option<AbsentVariables>,
    pub verbose: bool,
}

impl FromCliArgs<InlineArgs> for CliOverrides {
    fn from_cli_args(args: &InlineArgs) -> Self {
        let names = |values: &[String]| {
            (!values.is_empty()).then(|| NameListInput::List(values.to_vec()))
        };
        Self {
            functions_src: args.functions_src.clone(),
            manifest: args.manifest.clone(),
            inline_all: args.inline_all,
            include: names(&args.include),
            exclude: names(&args.exclude),
            max_concurrency: args.max_concurrency,
            cancel_on_failure: args.cancel_on_failure,
            absent_variables: args.absent_variables.map(Into::into),
            verbose: false,
        }
    }
}

impl ConfigMerge<CliOverrides> for InlinerConfig {
    /// Flags only switch settings on; options replace file values when given.
    fn merge_with(&mut self, other: CliOverrides) {
        if other.functions_src.is_some() {
            self.functions_src = other.functions_src;
        }
        if other.manifest.is_some() {
            self.manifest = other.manifest;
        }
        if other.include.is_some() {
            self.include = other.include;
        }
        if other.exclude.is_some() {
            self.exclude = other.exclude;
        }
        if other.max_concurrency.is_some() {
            self.max_concurrency = other.max_concurrency;
        }
        if let Some(absent_variables) = other.absent_variables {
            self.absent_variables = absent_variables;
        }
        self.inline_all |= other.inline_all;
        self.cancel_on_failure |= other.cancel_on_failure;
        self.verbose |= other.verbose;
    }
}

/// Build the effective configuration for a command.
pub fn build_layered_config(args: &InlineArgs, verbose: bool) -> anyhow::Result<InlinerConfig> {
    // Prefer an explicit --config, otherwise look for .envinline.yml/.yaml
    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => std::env::current_dir()
            .ok()
            .and_then(|dir| InlinerConfig::find_default_file(&dir)),
    };

    let mut config = match &config_path {
        Some(path) => InlinerConfig::from_yaml_file(path).map_err(|e| {
            anyhow::anyhow!("Failed to load configuration from {}: {}", path.display(), e)
        })?,
        None => InlinerConfig::default(),
    };

    let mut overrides = CliOverrides::from_cli_args(args);
    overrides.verbose = verbose;
    config.merge_with(overrides);

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{Cli, Commands};
    use clap::Parser;
    use envinline::BuildEvent;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn layered_config_prefers_cli_over_file() {
        let temp = tempdir().expect("temp dir");
        let config_path = temp.path().join("envinline.yml");
        fs::write(
            &config_path,
            "buildEvent: onBuild\nfunctions_src: from-file\ninclude: API_KEY\nmax_concurrency: 4\n",
        )
        .expect("write config");

        let cli = Cli::parse_from([
            "envinline",
            "run",
            "--config",
            config_path.to_str().unwrap(),
            "--functions-src",
            "from-cli",
            "--include",
            "NODE_ENV,SECRET",
            "--absent-variables",
            "undefined",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };

        let config = build_layered_config(&args.inline, true).expect("build config");

        assert_eq!(config.build_event, BuildEvent::Build);
        assert_eq!(config.functions_src, Some(PathBuf::from("from-cli")));
        assert_eq!(
            config.include,
            Some(NameListInput::List(vec![
                "NODE_ENV".to_string(),
                "SECRET".to_string()
            ]))
        );
        assert_eq!(config.max_concurrency, Some(4));
        assert_eq!(config.absent_variables, AbsentVariables::Undefined);
        assert!(config.verbose);
    }

    #[test]
    fn flags_do_not_clear_file_settings() {
        let mut config = InlinerConfig {
            inline_all: true,
            cancel_on_failure: true,
            functions_src: Some(PathBuf::from("functions")),
            ..InlinerConfig::default()
        };
        config.merge_with(CliOverrides::default());

        assert!(config.inline_all);
        assert!(config.cancel_on_failure);
        assert_eq!(config.functions_src, Some(PathBuf::from("functions")));
    }

    #[test]
    fn invalid_layered_config_is_rejected() {
        let temp = tempdir().expect("temp dir");
        let config_path = temp.path().join("envinline.yml");
        fs::write(&config_path, "functions_src: functions\n").expect("write config");

        let args = InlineArgs {
            config: Some(config_path),
            max_concurrency: Some(0),
            ..InlineArgs::default()
        };
        let err = build_layered_config(&args, false).unwrap_err();
        assert!(err.to_string().contains("max_concurrency"));
    }
}
