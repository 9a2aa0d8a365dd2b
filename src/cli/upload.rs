//! Upload and replace commands

use std::path::Path;

use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;

use crate::cli::{CommandContext, OutputFormat, UploadArgs};
use crate::models::UploadDisplay;
use crate::output;
use photoop::client::{FilePart, ScalarXmlDecoder};
use photoop::error::{Error, Result};

/// Uploads in flight at once
const MAX_CONCURRENT_UPLOADS: usize = 3;

/// Read a file into an upload attachment
async fn read_file_part(path: &Path) -> Result<FilePart> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo.jpg".to_string());
    let mime_type = FilePart::mime_for(&file_name);
    Ok(FilePart::new(file_name, mime_type, bytes))
}

/// Text fields sent with one upload
fn upload_fields(args: &UploadArgs, path: &Path) -> Vec<(String, String)> {
    let title = args.title.clone().unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let mut fields = vec![("title".to_string(), title)];
    if let Some(description) = &args.description {
        fields.push(("description".to_string(), description.clone()));
    }
    if let Some(tags) = &args.tags {
        fields.push(("tags".to_string(), tags.clone()));
    }
    fields.push((
        "is_public".to_string(),
        if args.public { "1" } else { "0" }.to_string(),
    ));
    fields
}

fn progress_bar(len: usize, format: OutputFormat) -> ProgressBar {
    if format == OutputFormat::Json {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

/// Upload every file, a few at a time
pub async fn run(ctx: &CommandContext, args: &UploadArgs) -> Result<()> {
    ctx.require_login()?;

    let decoder = ScalarXmlDecoder::photo_id();
    let bar = progress_bar(args.files.len(), ctx.format);

    let results: Vec<UploadDisplay> = stream::iter(args.files.iter())
        .map(|path| {
            let decoder = &decoder;
            let bar = &bar;
            async move {
                let name = path.display().to_string();
                bar.set_message(name.clone());

                let outcome = match read_file_part(path).await {
                    Ok(file) => {
                        ctx.client
                            .upload(&upload_fields(args, path), file, decoder)
                            .await
                    }
                    Err(e) => Err(e),
                };
                bar.inc(1);

                match outcome {
                    Ok(photo_id) if photo_id.is_empty() => UploadDisplay {
                        file: name,
                        photo_id: "-".to_string(),
                        status: "uploaded (no id returned)".to_string(),
                    },
                    Ok(photo_id) => UploadDisplay {
                        file: name,
                        photo_id,
                        status: "uploaded".to_string(),
                    },
                    Err(e) => {
                        warn!("Upload of {} failed: {}", name, e);
                        UploadDisplay {
                            file: name,
                            photo_id: "-".to_string(),
                            status: format!("failed: {}", e),
                        }
                    }
                }
            }
        })
        .buffer_unordered(MAX_CONCURRENT_UPLOADS)
        .collect()
        .await;
    bar.finish_and_clear();

    output::print_rows(&results, ctx.format)?;

    let failed = results
        .iter()
        .filter(|r| r.status.starts_with("failed"))
        .count();
    if failed > 0 {
        return Err(Error::Other(format!(
            "{} of {} uploads failed",
            failed,
            results.len()
        )));
    }
    Ok(())
}

/// Replace the image data of an existing photo
pub async fn replace(ctx: &CommandContext, photo_id: &str, path: &Path) -> Result<()> {
    ctx.require_login()?;

    let file = read_file_part(path).await?;
    let returned_id = ctx
        .client
        .replace(photo_id, file, &ScalarXmlDecoder::photo_id())
        .await?;

    let shown = if returned_id.is_empty() {
        photo_id
    } else {
        returned_id.as_str()
    };
    println!(
        "{} Replaced photo {} with {}",
        "✓".green(),
        shown,
        path.display()
    );
    Ok(())
}
