use std::error::Error;
use time::format_description;
use time::OffsetDateTime;

/// Emit `GEOPOSE_BUILD_<key>` for the version banner. An environment override wins.
fn stamp(key: &str, now: OffsetDateTime, format: &str) -> Result<(), Box<dyn Error>> {
    let var = format!("GEOPOSE_BUILD_{key}");
    let value = match std::env::var(&var) {
        Ok(value) => value,
        Err(_) => now.format(&format_description::parse(format)?)?,
    };
    println!("cargo:rustc-env={var}={value}");
    println!("cargo:rerun-if-env-changed={var}");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let now = OffsetDateTime::now_utc();
    stamp("DATE", now, "[month repr:short] [day padding:space] [year]")?;
    stamp("TIME", now, "[hour]:[minute]:[second]")?;
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
