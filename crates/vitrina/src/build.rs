use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    time::Instant,
};

use crate::{
    BuildOptions, BuildOutput, PageOutput,
    assets::{PageAssets, unique_assets},
    content::{ContentSources, markdown::escape_attribute},
    errors::BuildError,
    is_dev,
    logging::{FormatElapsedTimeOptions, format_elapsed_time, print_title},
    route::{PageContext, RenderResult, Resolution, RouteRecord, RouteTable, RouteTarget},
    routing::{file_path_for_route, guess_if_route_is_endpoint, match_key},
};
use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use log::{info, trace, warn};
use lol_html::{RewriteStrSettings, element, html_content::ContentType, rewrite_str};
use rayon::prelude::*;

pub mod metadata;
pub mod options;

pub(crate) fn execute_build(
    table: &RouteTable,
    content_sources: &mut ContentSources,
    options: &BuildOptions,
) -> Result<BuildOutput, BuildError> {
    let build_start = Instant::now();
    let built_at = Local::now();
    let mut build_metadata = BuildOutput::new(build_start);

    trace!(target: "build", "Setting up required directories...");

    if options.clean_output_dir && options.output_dir.exists() {
        fs::remove_dir_all(&options.output_dir).map_err(|source| BuildError::Write {
            path: options.output_dir.clone(),
            source,
        })?;
    }

    fs::create_dir_all(&options.output_dir).map_err(|source| BuildError::Write {
        path: options.output_dir.clone(),
        source,
    })?;

    info!(target: "build", "Output directory: {}", options.output_dir.display());
    if is_dev() {
        info!(target: "build", "Building in development mode");
    }

    let content_sources_start = Instant::now();
    print_title("initializing content sources");

    content_sources.init_all(&options.content_context())?;

    info!(target: "content", "{}", format!("Content sources initialized in {}", format_elapsed_time(
        content_sources_start.elapsed(),
        &FormatElapsedTimeOptions::default(),
    )).bold());

    print_title("generating pages");
    let pages_start = Instant::now();

    let route_format_options = FormatElapsedTimeOptions {
        additional_fn: Some(&|msg: ColoredString| {
            let formatted_msg = format!("(+{})", msg);
            if msg.fgcolor.is_none() {
                formatted_msg.dimmed()
            } else {
                formatted_msg.into()
            }
        }),
        ..Default::default()
    };

    let section_format_options = FormatElapsedTimeOptions::section();

    let routes = route_map(table);
    let content_sources: &ContentSources = content_sources;
    let pages = table
        .records()
        .par_iter()
        .map(|record| {
            let route_start = Instant::now();
            let page = build_record(record, table, &routes, content_sources, options, &built_at)?;

            match &page.redirect_to {
                Some(destination) => {
                    info!(target: "pages", "{} => {} {} {}", page.route, destination, page.file_path.to_string_lossy().dimmed(), format_elapsed_time(route_start.elapsed(), &route_format_options));
                }
                None => {
                    info!(target: "pages", "{} -> {} {}", page.route, page.file_path.to_string_lossy().dimmed(), format_elapsed_time(route_start.elapsed(), &route_format_options));
                }
            }

            Ok(page)
        })
        .collect::<Result<Vec<_>, BuildError>>()?;

    let page_count = pages.len();
    for page in pages {
        build_metadata.add_page(page);
    }

    info!(target: "pages", "{}", format!("generated {} pages in {}", page_count, format_elapsed_time(pages_start.elapsed(), &section_format_options)).bold());

    for alias in write_aliases(table, &routes, options)? {
        info!(target: "pages", "{} => {} {}", alias.route, alias.redirect_to.as_deref().unwrap_or_default(), alias.file_path.to_string_lossy().dimmed());
        build_metadata.add_alias(alias);
    }

    let content_assets = unique_assets(
        content_sources
            .sources()
            .iter()
            .flat_map(|source| source.assets()),
    );

    if !content_assets.is_empty() {
        let assets_start = Instant::now();
        print_title("copying content assets");

        let assets_dir = options.output_assets_dir();
        fs::create_dir_all(&assets_dir).map_err(|source| BuildError::Write {
            path: assets_dir.clone(),
            source,
        })?;

        for asset in content_assets {
            let dest_path = assets_dir.join(asset.filename());
            fs::copy(&asset.path, &dest_path).map_err(|source| BuildError::Write {
                path: dest_path.clone(),
                source,
            })?;

            info!(target: "assets", "{} -> {}", asset.path.to_string_lossy(), dest_path.to_string_lossy().dimmed());
            build_metadata.add_asset(dest_path, asset.path.clone());
        }

        info!(target: "build", "{}", format!("Content assets copied in {}", format_elapsed_time(assets_start.elapsed(), &section_format_options)).bold());
    }

    if options.static_dir.exists() {
        let assets_start = Instant::now();
        print_title("copying static files");

        copy_recursively(&options.static_dir, &options.output_dir, &mut build_metadata)
            .map_err(|source| BuildError::Write {
                path: options.static_dir.clone(),
                source,
            })?;

        info!(target: "build", "{}", format!("Static files copied in {}", format_elapsed_time(assets_start.elapsed(), &FormatElapsedTimeOptions::default())).bold());
    }

    info!(target: "SKIP_FORMAT", "{}", "");
    info!(target: "build", "{}", format!("Build completed in {}", format_elapsed_time(build_start.elapsed(), &section_format_options)).bold());

    Ok(build_metadata)
}

fn build_record(
    record: &RouteRecord,
    table: &RouteTable,
    routes: &BTreeMap<String, String>,
    content_sources: &ContentSources,
    options: &BuildOptions,
    built_at: &DateTime<Local>,
) -> Result<PageOutput, BuildError> {
    let file_path = file_path_for_route(record.path(), &options.output_dir);

    match &record.target {
        RouteTarget::Redirect { .. } => {
            let destination = match table.resolve(record.path())? {
                Resolution::Page(page) => page.path().to_string(),
                Resolution::NotFound { path, .. } => {
                    warn!(target: "pages", "{} redirects to {}, which no route matches", record.path(), path);
                    path
                }
            };

            let html = redirect_page(&destination, &options.base_url, routes);
            write_route_file(html.as_bytes(), &file_path)?;

            Ok(PageOutput {
                route: record.path().to_string(),
                file_path,
                component: None,
                redirect_to: Some(destination),
            })
        }
        RouteTarget::Page { component, props } => {
            let mut page_assets = PageAssets::default();

            let result = component.render_internal(&mut PageContext {
                props: props.as_deref(),
                content: content_sources,
                assets: &mut page_assets,
                routes: table,
                current_path: record.path(),
                base_url: &options.base_url,
                locale: options.locale,
                built_at,
            });

            // Static hosts serve the 404 page for any unknown path, including other casings of known ones.
            let head_script = (match_key(record.path()) == NOT_FOUND_ROUTE)
                .then(|| history_script(routes, None));

            let content = finish_page(result, &page_assets, head_script.as_deref(), record.path())?;
            write_route_file(&content, &file_path)?;

            Ok(PageOutput {
                route: record.path().to_string(),
                file_path,
                component: Some(component.component_name()),
                redirect_to: None,
            })
        }
    }
}

const NOT_FOUND_ROUTE: &str = "/404.html";

/// Match keys of every path that leads to a page, mapped to the declared path of that page.
fn route_map(table: &RouteTable) -> BTreeMap<String, String> {
    table
        .records()
        .iter()
        .filter_map(|record| match table.resolve(record.path()) {
            Ok(Resolution::Page(page)) => Some((match_key(record.path()), page.path().to_string())),
            _ => None,
        })
        .collect()
}

/// Inline script sending hash-history URLs (`/#/stats`) and other casings of a path (`/viz`) to the declared page.
///
/// Without a match, the browser goes to `fallback`, or stays put.
fn history_script(routes: &BTreeMap<String, String>, fallback: Option<&str>) -> String {
    let routes = serde_json::to_string(routes).unwrap_or_else(|_| "{}".to_string());
    let fallback = serde_json::to_string(&fallback).unwrap_or_else(|_| "null".to_string());

    // `<` is escaped so that no path can close the script element
    format!(
        "<script>(function(routes,fallback){{var hash=location.hash;var path=hash.indexOf(\"#/\")===0?hash.slice(1):location.pathname;path=path.split(\"?\")[0].replace(/\\/+$/,\"\").toLowerCase()||\"/\";var target=routes[path]||fallback;if(target&&target!==location.pathname){{location.replace(target);}}}})({},{});</script>",
        routes.replace('<', "\\u003c"),
        fallback.replace('<', "\\u003c"),
    )
}

/// A static page sending browsers to `destination` right away.
///
/// Hash-history URLs are forwarded to the page they name. Without JavaScript, a `meta refresh` takes over.
fn redirect_page(destination: &str, base_url: &Option<String>, routes: &BTreeMap<String, String>) -> String {
    let canonical = match base_url {
        Some(base) => format!("{}{}", base.trim_end_matches('/'), destination),
        None => destination.to_string(),
    };
    let script = history_script(routes, Some(destination));
    let destination = escape_attribute(destination);
    let canonical = escape_attribute(&canonical);

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Redirecting to {destination}</title>{script}<noscript><meta http-equiv=\"refresh\" content=\"0; url={destination}\"></noscript><link rel=\"canonical\" href=\"{canonical}\"></head><body><a href=\"{destination}\">Redirecting to {destination}</a></body></html>"
    )
}

/// Writes a redirect page at the lower-cased path of every mixed-case route, so `/viz` reaches `/Viz` on hosts
/// that match paths exactly.
///
/// An alias is skipped when its file already exists, which is the case on case-insensitive file systems.
fn write_aliases(
    table: &RouteTable,
    routes: &BTreeMap<String, String>,
    options: &BuildOptions,
) -> Result<Vec<PageOutput>, BuildError> {
    let mut aliases = Vec::new();

    for record in table.records() {
        let alias = match_key(record.path());
        if alias == record.path() || guess_if_route_is_endpoint(&alias) {
            continue;
        }

        let Some(destination) = routes.get(&alias) else {
            continue;
        };

        let file_path = file_path_for_route(&alias, &options.output_dir);
        if file_path.exists() {
            trace!(target: "pages", "{} already exists, skipping alias of {}", file_path.display(), record.path());
            continue;
        }

        let html = redirect_page(destination, &options.base_url, routes);
        write_route_file(html.as_bytes(), &file_path)?;

        aliases.push(PageOutput {
            route: alias,
            file_path,
            component: None,
            redirect_to: Some(destination.clone()),
        });
    }

    Ok(aliases)
}

fn copy_recursively(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    build_metadata: &mut BuildOutput,
) -> io::Result<()> {
    fs::create_dir_all(&destination)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let filetype = entry.file_type()?;
        if filetype.is_dir() {
            copy_recursively(
                entry.path(),
                destination.as_ref().join(entry.file_name()),
                build_metadata,
            )?;
        } else {
            let dest_path = destination.as_ref().join(entry.file_name());
            fs::copy(entry.path(), &dest_path)?;

            build_metadata.add_static_file(dest_path, entry.path());
        }
    }
    Ok(())
}

fn write_route_file(content: &[u8], file_path: &PathBuf) -> Result<(), BuildError> {
    let write = || -> io::Result<()> {
        // Create the parent directories if it doesn't exist
        if let Some(parent_dir) = file_path.parent() {
            fs::create_dir_all(parent_dir)?
        }

        fs::write(file_path, content)
    };

    write().map_err(|source| BuildError::Write {
        path: file_path.clone(),
        source,
    })
}

/// Turns a render result into the bytes of the output file, injecting `head_script` and included styles and scripts
/// into `<head>`.
fn finish_page(
    render_result: RenderResult,
    page_assets: &PageAssets,
    head_script: Option<&str>,
    route: &str,
) -> Result<Vec<u8>, BuildError> {
    match render_result {
        RenderResult::Text(html) => {
            if page_assets.is_empty() && head_script.is_none() {
                return Ok(html.into_bytes());
            }

            let included_styles: Vec<_> = page_assets.included_styles().collect();
            let included_scripts: Vec<_> = page_assets.included_scripts().collect();

            let element_content_handlers = vec![
                // Add included scripts and styles to the head
                element!("head", |el| {
                    if let Some(script) = head_script {
                        el.append(script, ContentType::Html);
                    }

                    for style in &included_styles {
                        el.append(
                            &format!("<link rel=\"stylesheet\" href=\"{}\">", style),
                            ContentType::Html,
                        );
                    }

                    for script in &included_scripts {
                        el.append(
                            &format!("<script src=\"{}\" type=\"module\"></script>", script),
                            ContentType::Html,
                        );
                    }

                    Ok(())
                }),
            ];

            let output = rewrite_str(
                &html,
                RewriteStrSettings {
                    element_content_handlers,
                    ..RewriteStrSettings::new()
                },
            )
            .map_err(|source| BuildError::Rewrite {
                route: route.to_string(),
                source,
            })?;

            Ok(output.into_bytes())
        }
        RenderResult::Raw(content) => {
            if !page_assets.is_empty() {
                return Err(BuildError::InvalidRenderResult {
                    route: route.to_string(),
                });
            }

            Ok(content)
        }
        RenderResult::Err(source) => Err(BuildError::Render {
            route: route.to_string(),
            source,
        }),
    }
}
