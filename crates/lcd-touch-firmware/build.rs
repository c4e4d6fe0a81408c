//! Bakes board settings from `.env` into the firmware.
//!
//! Each key may come from the process environment, from `.env` next to this
//! manifest, or fall back to the default below. The firmware reads them with
//! `env!`.

use std::collections::HashMap;
use std::path::Path;

const SETTINGS: [(&str, &str); 8] = [
    ("TOUCH_SWAP_XY", "true"),
    ("TOUCH_MIRROR_X", "true"),
    ("TOUCH_MIRROR_Y", "false"),
    ("TOUCH_X_OFFSET", "0"),
    ("TOUCH_Y_OFFSET", "-81"),
    ("TOUCH_POLL_MS", "20"),
    // Empty means the panel is polled
    ("TOUCH_INT_GPIO", ""),
    ("BACKLIGHT_PERCENT", "100"),
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.env");

    let mut from_file = read_dotenv(Path::new(".env"));

    for (key, default) in SETTINGS {
        println!("cargo:rerun-if-env-changed={key}");
        let value = std::env::var(key)
            .ok()
            .or_else(|| from_file.remove(key))
            .unwrap_or_else(|| default.to_string());
        println!("cargo:rustc-env={key}={value}");
    }

    if std::env::var("CARGO_CFG_TARGET_ARCH").as_deref() == Ok("xtensa") {
        println!("cargo:rustc-link-arg=-Tlinkall.x");
    }
}

fn read_dotenv(path: &Path) -> HashMap<String, String> {
    let mut values = HashMap::new();
    let Ok(iter) = dotenvy::from_path_iter(path) else {
        return values;
    };
    for item in iter {
        match item {
            Ok((key, value)) => {
                values.insert(key, value);
            }
            Err(e) => println!("cargo:warning=Skipping malformed .env entry: {e}"),
        }
    }
    values
}
