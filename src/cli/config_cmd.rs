use crate::config::Config;

pub fn show() -> anyhow::Result<()> {
    let config = Config::load()?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

pub fn init() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.save()?;
    println!("wrote {}", Config::path()?.display());
    Ok(())
}

pub fn path() -> anyhow::Result<()> {
    println!("{}", Config::path()?.display());
    Ok(())
}
