//! Photo browsing and deletion commands

use std::sync::Arc;

use colored::Colorize;
use dialoguer::{Confirm, theme::ColorfulTheme};
use log::debug;

use crate::cli::{CommandContext, OutputFormat};
use crate::models::{PhotoDisplay, PhotoInfoDisplay};
use crate::output;
use photoop::cache::KeyedCache;
use photoop::client::models::{PhotoInfo, PhotoInfoEnvelope, PhotosEnvelope};
use photoop::client::{JsonDecoder, RequestSpec, VoidDecoder};
use photoop::error::Result;

/// Largest page the API serves
const MAX_PER_PAGE: u32 = 500;

/// List the signed-in user's photos
pub async fn list(ctx: &CommandContext, page: u32, per_page: u32) -> Result<()> {
    ctx.require_login()?;

    let spec = RequestSpec::rest("flickr.people.getPhotos")
        .param("user_id", "me")
        .param("page", page.max(1).to_string())
        .param("per_page", per_page.clamp(1, MAX_PER_PAGE).to_string());

    let envelope = ctx
        .client
        .request(&spec, &JsonDecoder::<PhotosEnvelope>::new())
        .await?;
    let listing = envelope.photos;

    let rows: Vec<PhotoDisplay> = listing.photo.iter().map(PhotoDisplay::from).collect();
    output::print_value(&listing, &rows, ctx.format)?;

    if ctx.format == OutputFormat::Table && listing.pages > 1 {
        println!(
            "{}",
            format!(
                "Page {} of {} ({} photos). Use --page to see more.",
                listing.page, listing.pages, listing.total
            )
            .dimmed()
        );
    }
    Ok(())
}

/// Show details for each requested photo. Repeated IDs are fetched once.
pub async fn info(ctx: &CommandContext, photo_ids: &[String]) -> Result<()> {
    let cache: KeyedCache<String, Arc<PhotoInfo>> = KeyedCache::new(ctx.config.cache_capacity);
    let decoder = JsonDecoder::<PhotoInfoEnvelope>::new();
    let signed_in = ctx.auth.is_logged_in();

    let mut infos = Vec::with_capacity(photo_ids.len());
    for id in photo_ids {
        let mut spec = RequestSpec::rest("flickr.photos.getInfo").param("photo_id", id);
        // Public photos can be read without a session
        if !signed_in {
            spec = spec.anonymous();
        }

        let key = spec.cache_key();
        let info = match cache.get(&key) {
            Ok(info) => {
                debug!("Cache hit: photo {}", id);
                info
            }
            Err(_) => {
                let fetched = Arc::new(ctx.client.request(&spec, &decoder).await?.photo);
                cache.set(key, Arc::clone(&fetched));
                fetched
            }
        };
        infos.push(info);
    }

    let rows: Vec<PhotoInfoDisplay> = infos.iter().map(|i| PhotoInfoDisplay::from(i.as_ref())).collect();
    let values: Vec<&PhotoInfo> = infos.iter().map(Arc::as_ref).collect();
    output::print_value(&values, &rows, ctx.format)
}

/// Delete a photo after confirmation
pub async fn delete(ctx: &CommandContext, photo_id: &str, yes: bool) -> Result<()> {
    ctx.require_login()?;

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete photo {}? This cannot be undone", photo_id))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let spec = RequestSpec::rest("flickr.photos.delete")
        .param("photo_id", photo_id)
        .post();
    ctx.client.request(&spec, &VoidDecoder).await?;

    println!("{} Deleted photo {}", "✓".green(), photo_id);
    Ok(())
}
