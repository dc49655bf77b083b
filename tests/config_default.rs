// Changes the process working directory, so it stays the only test in this binary.

use std::net::SocketAddr;

use camino::Utf8PathBuf;

use biodiversity_api::config::{ConfigLoader, ConfigOverrides, DEFAULT_CONFIG_FILE, ServeConfig};

#[test]
fn default_config_file_is_optional_and_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let missing = ConfigLoader::resolve(None, ConfigOverrides::default());

    std::fs::write(
        DEFAULT_CONFIG_FILE,
        r#"{"database": "local.sqlite", "bind": "0.0.0.0:8080"}"#,
    )
    .unwrap();
    let present = ConfigLoader::resolve(None, ConfigOverrides::default());
    let overridden = ConfigLoader::resolve(
        None,
        ConfigOverrides {
            database: None,
            bind: Some("127.0.0.1:9000".parse().unwrap()),
        },
    );

    std::env::set_current_dir(previous).unwrap();

    assert_eq!(missing.unwrap(), ServeConfig::default());

    let present = present.unwrap();
    assert_eq!(present.database, Utf8PathBuf::from("local.sqlite"));
    assert_eq!(present.bind, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());

    let overridden = overridden.unwrap();
    assert_eq!(overridden.database, Utf8PathBuf::from("local.sqlite"));
    assert_eq!(overridden.bind.port(), 9000);
}
