// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests YAML parsing, defaults, discovery order, and init scaffolding.

use rollwatch::config::*;
use rollwatch::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn parse_full_config() {
        let yaml = r#"
resource: installation/kyma-installation
namespace: default
kubectl:
  binary: /usr/local/bin/kubectl
  kubeconfig: /home/ci/.kube/config
  context: gardener-dev
watch:
  interval: 5s
  timeout: 1h
  call_timeout: 20s
hooks:
  confirm: true
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.resource.name(), "kyma-installation");
        assert_eq!(config.namespace.as_deref(), Some("default"));
        assert_eq!(config.kubectl.binary, "/usr/local/bin/kubectl");
        assert_eq!(
            config.kubectl.kubeconfig,
            Some(PathBuf::from("/home/ci/.kube/config"))
        );
        assert_eq!(config.kubectl.context.as_deref(), Some("gardener-dev"));
        assert_eq!(config.watch.interval, Duration::from_secs(5));
        assert_eq!(config.watch.timeout, Some(Duration::from_secs(3600)));
        assert_eq!(config.watch.call_timeout, Duration::from_secs(20));
        assert!(config.hooks.confirm);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = Config::from_yaml("watch:\n  timeout: 30m\n").unwrap();
        assert_eq!(config.watch.timeout, Some(Duration::from_secs(1800)));
        assert_eq!(config.watch.interval, Duration::from_secs(10));
        assert_eq!(config.kubectl.binary, "kubectl");
        assert!(!config.hooks.confirm);
    }

    #[test]
    fn invalid_resource_is_rejected() {
        let err = Config::from_yaml("resource: kyma-installation\n").unwrap_err();
        assert!(err.to_string().contains("<kind>/<name>"));
    }

    #[test]
    fn invalid_duration_is_rejected() {
        assert!(Config::from_yaml("watch:\n  interval: often\n").is_err());
    }

    #[test]
    fn empty_namespace_is_rejected() {
        let err = Config::from_yaml("namespace: \"\"\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}

mod discovery {
    use super::*;

    #[test]
    fn missing_file_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::discover(dir.path()),
            Err(Error::ConfigNotFound(_))
        ));
        assert_eq!(
            Config::discover_or_default(dir.path()).unwrap(),
            Config::default()
        );
    }

    #[test]
    fn yml_wins_over_yaml_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "namespace: first\n").unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME_ALT), "namespace: second\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.namespace.as_deref(), Some("first"));
    }

    #[test]
    fn dot_dir_config_is_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".rollwatch")).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME_DIR),
            "resource: installation/custom\n",
        )
        .unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.resource.name(), "custom");
    }
}

mod init {
    use super::*;

    #[test]
    fn template_round_trips_through_parser() {
        let yaml = generate_template_yaml(&Config::template());
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, Config::template());
    }

    #[test]
    fn init_writes_requested_resource() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), Some("installation/edge"), false).unwrap();

        let config = Config::load(&dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config.resource.to_string(), "installation/edge");
    }

    #[test]
    fn init_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), None, false).unwrap();

        assert!(matches!(
            init_config(dir.path(), None, false),
            Err(Error::AlreadyExists(_))
        ));
        init_config(dir.path(), Some("installation/other"), true).unwrap();
    }

    #[test]
    fn init_rejects_invalid_resource() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            init_config(dir.path(), Some("nope"), false),
            Err(Error::InvalidConfig(_))
        ));
        assert!(!dir.path().join(CONFIG_FILENAME).exists());
    }
}
