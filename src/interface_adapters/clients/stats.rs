use crate::domain::ports::StatsStore;
use crate::domain::{Identity, LeaderboardEntry, ScoreOrder, ScoreRecord, SyncError};
use crate::interface_adapters::protocol::{
    BestScoreRow, ErrorResponse, LeaderboardRowDto, ScoreRowDto,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

const TABLE_PATH: &str = "/rest/v1/game_stats";

// Thin reqwest client for the hosted `game_stats` table.
#[derive(Clone)]
pub struct StatsClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl StatsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}{TABLE_PATH}", self.base_url)
    }

    // Every table call carries the project key. The bearer is the player's
    // token, or the project key itself for anonymous reads.
    fn authorized(&self, request: RequestBuilder, identity: Option<&Identity>) -> RequestBuilder {
        let token = identity.map_or(self.api_key.as_str(), |identity| {
            identity.access_token.as_str()
        });
        request.header("apikey", &self.api_key).bearer_auth(token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, SyncError> {
        let response = request
            .send()
            .await
            .map_err(|err| SyncError::Transport(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Keep upstream status/message so callers can tell auth from outages.
        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|payload| payload.message);
        Err(SyncError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    // Filters go through `query` so ids are percent-encoded.
    async fn rows<T: serde::de::DeserializeOwned>(
        &self,
        identity: Option<&Identity>,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, SyncError> {
        let request = self.http.get(self.table_url()).query(filters);
        let response = self.send(self.authorized(request, identity)).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|err| SyncError::Decode(err.to_string()))
    }
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

fn score_order(order: ScoreOrder) -> String {
    match order {
        ScoreOrder::HigherIsBetter => "score.desc".to_string(),
        ScoreOrder::LowerIsBetter => "score.asc".to_string(),
    }
}

#[async_trait]
impl StatsStore for StatsClient {
    async fn submit_score(&self, identity: &Identity, record: ScoreRecord) -> Result<(), SyncError> {
        let request = self
            .http
            .post(self.table_url())
            .header("Prefer", "return=minimal")
            .json(&ScoreRowDto::from(record));
        self.send(self.authorized(request, Some(identity))).await?;
        Ok(())
    }

    async fn fetch_best_score(
        &self,
        identity: &Identity,
        game_id: &str,
        order: ScoreOrder,
    ) -> Result<Option<i64>, SyncError> {
        let filters = [
            ("select", "score".to_string()),
            ("user_id", eq(&identity.user_id)),
            ("game_id", eq(game_id)),
            ("order", score_order(order)),
            ("limit", "1".to_string()),
        ];

        let rows: Vec<BestScoreRow> = self.rows(Some(identity), &filters).await?;
        Ok(rows.first().map(|row| row.score))
    }

    async fn recent_scores(
        &self,
        identity: &Identity,
        game_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScoreRecord>, SyncError> {
        let mut filters = vec![
            ("select", "*".to_string()),
            ("user_id", eq(&identity.user_id)),
        ];
        if let Some(game_id) = game_id {
            filters.push(("game_id", eq(game_id)));
        }
        filters.push(("order", "played_at.desc".to_string()));
        filters.push(("limit", limit.to_string()));

        let rows: Vec<ScoreRowDto> = self.rows(Some(identity), &filters).await?;
        Ok(rows.into_iter().map(ScoreRecord::from).collect())
    }

    async fn leaderboard(
        &self,
        identity: Option<&Identity>,
        game_id: &str,
        order: ScoreOrder,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, SyncError> {
        let filters = [
            ("select", "user_id,score,played_at,profiles(username)".to_string()),
            ("game_id", eq(game_id)),
            ("order", score_order(order)),
            ("limit", limit.to_string()),
        ];

        let rows: Vec<LeaderboardRowDto> = self.rows(identity, &filters).await?;
        Ok(rows.into_iter().map(LeaderboardEntry::from).collect())
    }
}
