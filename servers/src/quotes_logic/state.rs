use crate::quotes_logic::config::Config;
use lib_quotes::loggers::loggerlocal::LoggerLocal;
use lib_quotes::markets::barchart::apicall::ApiCallBarchart;
use lib_quotes::markets::barchart::futures::{FuturesQuotes, QuoteSource};
use lib_quotes::markets::currency::awesomeapi::ApiCallAwesome;
use lib_quotes::markets::currency::investing::ApiCallInvesting;
use lib_quotes::markets::currency::rate::DollarRate;
use std::sync::Arc;

/// Request handlers' view of the providers.
///
/// Holds only immutable clients; every request opens its own upstream sessions.
#[derive(Clone)]
pub struct AppState {
    pub quotes: Arc<dyn QuoteSource>,
    pub dollar: Arc<DollarRate>,
}

impl AppState {
    pub fn new(quotes: Arc<dyn QuoteSource>, dollar: Arc<DollarRate>) -> Self {
        Self { quotes, dollar }
    }

    /// Wires the production providers from configuration.
    pub fn from_config(config: &Config, logger: Arc<LoggerLocal>) -> Self {
        let defaults = Config::defaults();
        let pick = |value: &Option<String>, fallback: &Option<String>| {
            value.clone().or_else(|| fallback.clone()).unwrap_or_default()
        };

        let barchart = Arc::new(ApiCallBarchart::with_base_url(
            &pick(&config.barchart_url, &defaults.barchart_url),
            logger.clone(),
        ));
        let quotes = Arc::new(FuturesQuotes::new(barchart, logger.clone()));

        let investing = ApiCallInvesting::with_urls(
            &pick(&config.investing_page_url, &defaults.investing_page_url),
            &pick(&config.investing_api_url, &defaults.investing_api_url),
            logger.clone(),
        )
        .with_timeout(config.currency_timeout());
        let awesome = ApiCallAwesome::with_base_url(&pick(&config.awesomeapi_url, &defaults.awesomeapi_url), logger.clone())
            .with_timeout(config.currency_timeout());

        let dollar = DollarRate::new(Arc::new(investing), Arc::new(awesome), logger)
            .with_max_age(config.max_sample_age());

        Self::new(quotes, Arc::new(dollar))
    }
}
