//! poe.ninja price feed client.
//!
//! Two kinds of read-only GET: one currency overview, plus one item overview
//! per configured item type. Everything is merged into a single
//! [`ReferencePrices`].

use std::time::Duration;

use reqwest::{Client, Request};
use tracing::{debug, info};

use crate::domain::error::LedgerError;
use crate::domain::reference::ReferencePrices;
use crate::ports::price_port::PriceFeed;

const USER_AGENT: &str = concat!("flipledger/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct NinjaFeed {
    http: Client,
    base_url: String,
    league: String,
    item_types: Vec<String>,
}

impl NinjaFeed {
    pub fn new(
        base_url: impl Into<String>,
        league: impl Into<String>,
        item_types: Vec<String>,
    ) -> Result<Self, LedgerError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LedgerError::fetch(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            league: league.into(),
            item_types,
        })
    }

    fn overview_request(&self, endpoint: &str, kind: &str) -> Result<Request, LedgerError> {
        self.http
            .get(format!("{}/{endpoint}", self.base_url))
            .query(&[("league", self.league.as_str()), ("type", kind)])
            .build()
            .map_err(|e| LedgerError::fetch(format!("invalid {endpoint} request: {e}")))
    }

    async fn get_text(&self, request: Request) -> Result<String, LedgerError> {
        let url = request.url().to_string();
        debug!(%url, "requesting price overview");
        let resp = self
            .http
            .execute(request)
            .await
            .map_err(|e| LedgerError::fetch(format!("request to {url} failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LedgerError::fetch(format!("{url} returned {status}")));
        }
        resp.text()
            .await
            .map_err(|e| LedgerError::fetch(format!("reading {url} failed: {e}")))
    }

    pub async fn fetch_async(&self) -> Result<ReferencePrices, LedgerError> {
        let mut prices = ReferencePrices::new();

        let body = self
            .get_text(self.overview_request("currencyoverview", "Currency")?)
            .await?;
        let currencies = prices.merge_currency_overview(&body)?;

        let mut items = 0;
        for item_type in &self.item_types {
            let body = self
                .get_text(self.overview_request("itemoverview", item_type)?)
                .await?;
            items += prices.merge_item_overview(&body)?;
        }

        info!(league = %self.league, currencies, items, "reference prices fetched");
        Ok(prices)
    }
}

impl PriceFeed for NinjaFeed {
    fn fetch(&self) -> Result<ReferencePrices, LedgerError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.fetch_async())
    }
}
