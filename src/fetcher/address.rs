use url::form_urlencoded;

use crate::config::Configuration;
use crate::domain::CurrentPostContext;

/// Builds the feed request address:
/// `<origin><feed_path>?alt=json-in-script&max-results=<N>[&category=<label>]`.
///
/// Parameters are always emitted in that order, so equal inputs give equal
/// addresses.
#[derive(Debug, Clone)]
pub struct FeedAddressBuilder {
    origin: String,
    feed_path: String,
    max_results: usize,
    category: Option<String>,
}

impl FeedAddressBuilder {
    pub fn new(origin: &str, feed_path: &str) -> Self {
        let feed_path = if feed_path.starts_with('/') {
            feed_path.to_string()
        } else {
            format!("/{}", feed_path)
        };

        Self {
            origin: origin.trim_end_matches('/').to_string(),
            feed_path,
            max_results: 50,
            category: None,
        }
    }

    /// Address for one widget on one page. Only the first label is used as a
    /// category filter, and only when label filtering is enabled.
    pub fn for_widget(config: &Configuration, context: &CurrentPostContext) -> Self {
        let options = config.options();
        let category = if options.filter_by_labels {
            context.primary_label()
        } else {
            None
        };

        Self::new(config.blog_origin(), &options.feed_path)
            .max_results(options.feed_max_results.max(config.max_posts()))
            .category(category)
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = category.map(str::to_string);
        self
    }

    pub fn build(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("alt", "json-in-script");
        query.append_pair("max-results", &self.max_results.to_string());
        if let Some(category) = &self.category {
            query.append_pair("category", category);
        }

        let address = format!("{}{}?{}", self.origin, self.feed_path, query.finish());
        tracing::debug!("Feed address: {}", address);
        address
    }
}
