/// Learning keyword → category associations from manual corrections

use std::collections::HashSet;

use crate::config::{OTHER, Settings};
use crate::domain::{hostname, site_name};
use crate::error::{LinkError, Result};
use crate::keywords::{extract_keywords, url_keywords};
use crate::link_data::{KeywordMap, LinkRecord};
use crate::storage::{KEYWORD_TO_CATEGORY, KeyValueStore, load, save};

/// Keywords that represent a link: its site name first, then title words
///
/// Title words that also appear in the URL are skipped, as is the site name
/// when the URL cannot be parsed. Deduplicated in first-seen order and capped
/// at `settings.max_keywords`.
pub fn candidate_keywords(record: &LinkRecord, settings: &Settings) -> Vec<String> {
    let mut candidates = Vec::new();

    match hostname(&record.url) {
        Ok(Some(host)) => {
            if let Some(site) = site_name(&host) {
                if site.chars().count() >= settings.min_hostname_len {
                    candidates.push(site);
                }
            }
        }
        Ok(None) => {}
        Err(e) => log::debug!("No hostname signal for {:?}: {}", record.url, e),
    }

    let in_url: HashSet<String> = url_keywords(&record.url, settings.min_keyword_len)
        .into_iter()
        .collect();

    candidates.extend(
        extract_keywords(&record.title, settings.min_keyword_len)
            .into_iter()
            .filter(|word| !in_url.contains(word)),
    );

    let mut seen = HashSet::new();
    candidates.retain(|word| seen.insert(word.clone()));
    candidates.truncate(settings.max_keywords);
    candidates
}

/// Record that `record`'s keywords mean `category`
///
/// Overwrites whatever category those keywords pointed at before. Learning
/// "Other", or a link with no usable keywords, leaves the map untouched.
/// Returns the keywords written.
pub fn learn<S>(
    store: &mut S,
    settings: &Settings,
    record: &LinkRecord,
    category: &str,
) -> Result<Vec<String>>
where
    S: KeyValueStore + ?Sized,
{
    if category == OTHER {
        return Ok(Vec::new());
    }

    let keywords = candidate_keywords(record, settings);
    if keywords.is_empty() {
        log::debug!("Nothing to learn from {:?}", record.url);
        return Ok(keywords);
    }

    let mut map: KeywordMap = match load(store, KEYWORD_TO_CATEGORY) {
        Ok(map) => map.unwrap_or_default(),
        Err(LinkError::Serialization(e)) => {
            log::warn!("Unreadable {}, starting a new one: {}", KEYWORD_TO_CATEGORY, e);
            KeywordMap::new()
        }
        Err(e) => return Err(e),
    };
    for keyword in &keywords {
        map.insert(keyword.clone(), category.to_string());
    }
    save(store, KEYWORD_TO_CATEGORY, &map)?;

    log::info!("Learned {:?} -> {}", keywords, category);
    Ok(keywords)
}
