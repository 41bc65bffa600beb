//! Nightscout data fetching.
//!
//! Responses are saved to disk exactly as received. Error statuses are logged
//! but the body is still written, unless strict checking is on. Connection
//! failures always abort.

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{
    DateTime, Days, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone,
};
use chrono_tz::Tz;
use reqwest::blocking::Client;
use url::Url;

use crate::constants;
use crate::error::{AutotuneError, Result};
use crate::state::{date_key, AutotuneLayout};

/// Status and body of a completed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Blocking HTTP GET.
pub trait HttpGet {
    /// Fetches `url`.
    ///
    /// # Errors
    ///
    /// Returns [`AutotuneError::Network`] when no response was received.
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// [`HttpGet`] backed by a blocking `reqwest` client.
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Builds the client. `timeout` of `None` disables the request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AutotuneError::Config`] if the TLS backend cannot be set up.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", constants::APP_NAME, constants::APP_VERSION))
            .build()
            .map_err(|e| AutotuneError::Config {
                context: "http client",
                details: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl HttpGet for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let network = |source| AutotuneError::Network {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().map_err(network)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(network)?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// `created_at` bounds for the treatments query.
///
/// Both dates are anchored at 20:00 local time in `tz`; the window opens four
/// hours before the start anchor and closes one calendar day after the end
/// anchor.
///
/// # Errors
///
/// Returns [`AutotuneError::InvalidTimestamp`] if a date is out of range.
pub fn treatment_window(
    start: NaiveDate,
    end: NaiveDate,
    tz: Tz,
) -> Result<(DateTime<Tz>, DateTime<Tz>)> {
    let hour = constants::TREATMENT_ANCHOR_HOUR;
    let from = local_time(start, hour, tz)? - TimeDelta::hours(constants::TREATMENT_LOOKBACK_HOURS);
    let to = local_time(end, hour, tz)?
        .checked_add_days(Days::new(constants::TREATMENT_LOOKAHEAD_DAYS))
        .ok_or_else(|| invalid_timestamp(end, hour, tz))?;
    Ok((from, to))
}

fn local_time(date: NaiveDate, hour: u32, tz: Tz) -> Result<DateTime<Tz>> {
    date.and_hms_opt(hour, 0, 0)
        .and_then(|naive| resolve_local(naive, tz))
        .ok_or_else(|| invalid_timestamp(date, hour, tz))
}

/// Maps a wall-clock time to an instant in `tz`.
///
/// Ambiguous times take the earlier instant. Times skipped by a forward
/// transition land on the first instant after the gap, which is where the
/// wall clock reads them with the offset in force before the jump.
fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => Some(t),
        LocalResult::None => {
            let before = naive.checked_sub_signed(TimeDelta::days(1))?;
            let offset = tz.from_local_datetime(&before).earliest()?.offset().fix();
            let utc = naive
                .checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))?;
            Some(tz.from_utc_datetime(&utc))
        }
    }
}

fn invalid_timestamp(date: NaiveDate, hour: u32, tz: Tz) -> AutotuneError {
    AutotuneError::InvalidTimestamp {
        date: date_key(date),
        hour,
        timezone: tz.name().to_string(),
    }
}

fn endpoint(host: &Url, path: &str, query: &[(&str, String)]) -> String {
    let base = host.as_str().trim_end_matches('/');
    if query.is_empty() {
        return format!("{base}{path}");
    }
    let query = query
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}{path}?{query}")
}

/// Downloads everything the tuning loop reads from Nightscout.
pub struct NightscoutFetcher<'a, H: HttpGet> {
    http: &'a H,
    host: &'a Url,
    tz: Tz,
    strict: bool,
}

impl<'a, H: HttpGet> NightscoutFetcher<'a, H> {
    pub fn new(http: &'a H, host: &'a Url, tz: Tz, strict: bool) -> Self {
        Self {
            http,
            host,
            tz,
            strict,
        }
    }

    /// URL of the treatments query for `[start, end]`.
    ///
    /// # Errors
    ///
    /// See [`treatment_window`].
    pub fn treatments_url(&self, start: NaiveDate, end: NaiveDate) -> Result<String> {
        let (from, to) = treatment_window(start, end, self.tz)?;
        let fmt = constants::TREATMENT_TIMESTAMP_FORMAT;
        Ok(endpoint(
            self.host,
            constants::NS_TREATMENTS_PATH,
            &[
                ("find[created_at][$gte]", from.format(fmt).to_string()),
                ("find[created_at][$lte]", to.format(fmt).to_string()),
            ],
        ))
    }

    /// URL of the glucose entries query for one calendar day.
    ///
    /// # Errors
    ///
    /// Returns [`AutotuneError::InvalidTimestamp`] if `date` is the last
    /// representable day. A midnight skipped by a daylight-saving change
    /// resolves to the end of the gap.
    pub fn entries_url(&self, date: NaiveDate) -> Result<String> {
        let next = date.succ_opt().ok_or_else(|| invalid_timestamp(date, 0, self.tz))?;
        let from = local_time(date, 0, self.tz)?.timestamp_millis();
        let to = local_time(next, 0, self.tz)?.timestamp_millis();
        Ok(endpoint(
            self.host,
            constants::NS_ENTRIES_PATH,
            &[
                ("find[date][$gte]", from.to_string()),
                ("find[date][$lte]", to.to_string()),
                ("count", constants::NS_ENTRIES_COUNT.to_string()),
            ],
        ))
    }

    #[must_use]
    pub fn profile_url(&self) -> String {
        endpoint(self.host, constants::NS_PROFILE_PATH, &[])
    }

    /// Saves all treatments for the date range to `dest`.
    ///
    /// # Errors
    ///
    /// Network failures, write failures, and (strict only) error statuses.
    pub fn fetch_treatments(&self, start: NaiveDate, end: NaiveDate, dest: &Path) -> Result<()> {
        tracing::info!(%start, %end, "grabbing Nightscout treatments.json");
        let url = self.treatments_url(start, end)?;
        self.fetch_to(&url, dest)
    }

    /// Saves one entries file per day, in the order given.
    ///
    /// # Errors
    ///
    /// Network failures, write failures, and (strict only) error statuses.
    pub fn fetch_entries(&self, days: &[NaiveDate], layout: &AutotuneLayout) -> Result<()> {
        tracing::info!(days = days.len(), "grabbing Nightscout entries/sgv.json");
        for &date in days {
            self.fetch_to(&self.entries_url(date)?, &layout.ns_entries(date))?;
        }
        Ok(())
    }

    /// Saves the Nightscout profile document to `dest`.
    ///
    /// # Errors
    ///
    /// Network failures, write failures, and (strict only) error statuses.
    pub fn fetch_profile(&self, dest: &Path) -> Result<()> {
        tracing::info!("grabbing Nightscout profile.json");
        self.fetch_to(&self.profile_url(), dest)
    }

    fn fetch_to(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::debug!(url, "GET");
        let response = self.http.get(url)?;

        if !response.is_success() {
            if self.strict {
                return Err(AutotuneError::HttpStatus {
                    url: url.to_string(),
                    status: response.status,
                });
            }
            tracing::warn!(
                url,
                status = response.status,
                dest = %dest.display(),
                "Nightscout returned an error status, saving the body anyway"
            );
        }

        fs::write(dest, &response.body).map_err(|e| AutotuneError::io(dest, e))?;
        tracing::debug!(dest = %dest.display(), bytes = response.body.len(), "saved");
        Ok(())
    }
}
