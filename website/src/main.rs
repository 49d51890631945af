use content::content_sources;
use routes::route_table;
use vitrina::{BuildOptions, BuildOutput, Locale, coronate};

mod content;
mod layout;
mod routes;

fn main() -> Result<BuildOutput, Box<dyn std::error::Error>> {
    coronate(route_table(), content_sources(), build_options())
}

pub fn build_options() -> BuildOptions {
    BuildOptions {
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").into(),
        locale: Locale::sl_SI,
        ..Default::default()
    }
}
