use std::path::PathBuf;

use confique::Config as DeriveConfig;

/// Defaults for the `chart` command. Environment variables override the config file and
/// command line flags override both.
#[derive(Debug, DeriveConfig)]
pub struct Config {
    /// Chart width in pixels.
    #[config(env = "VEGABUILD_WIDTH", default = 960)]
    pub width: i64,

    /// Chart height in pixels.
    #[config(env = "VEGABUILD_HEIGHT", default = 500)]
    pub height: i64,

    /// Indent written JSON with two spaces.
    #[config(default = true)]
    pub pretty: bool,

    /// Where `--split-data` writes the values of the first data set when no path is given.
    #[config(default = "data.json")]
    pub data_path: PathBuf,

    /// Where `--html` writes the scaffold page when no path is given.
    #[config(default = "vega_template.html")]
    pub html_path: PathBuf,

    /// ColorBrewer palette for the `color` scale of every chart, e.g. `Set2`. See `vegabuild
    /// palettes` for the full list.
    #[config(env = "VEGABUILD_PALETTE")]
    pub palette: Option<String>,
}
