use serde::Deserialize;
use std::time::Duration;
use watchcord_models::{Channel, User};

use crate::error::GatewayError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Minimal REST surface of the chat platform: enough to resolve the
/// operator-configured identities at startup. The bearer credential is
/// passed through untouched.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl RestClient {
    pub fn new(api_base: &str, token: &str) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent("watchcord/0.1")
            .build()
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub async fn fetch_user(&self, user_id: i64) -> Result<User, GatewayError> {
        let dto: UserDto = self.get(&format!("users/{user_id}")).await?;
        dto.into_model()
    }

    pub async fn fetch_channel(&self, channel_id: i64) -> Result<Channel, GatewayError> {
        let dto: ChannelDto = self.get(&format!("channels/{channel_id}")).await?;
        dto.into_model()
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let url = format!("{}/{}", self.api_base, path);
        let resp = self
            .http
            .get(&url)
            .header("authorization", format!("Bot {}", self.token))
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(GatewayError::Status {
                status: resp.status().as_u16(),
                url,
            });
        }
        resp.json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

/// Ids arrive as string-encoded snowflakes on the wire.
fn parse_snowflake(raw: &str) -> Result<i64, GatewayError> {
    raw.parse::<i64>()
        .map_err(|_| GatewayError::Decode(format!("bad snowflake: {raw}")))
}

#[derive(Debug, Deserialize)]
struct UserDto {
    id: String,
    username: String,
    global_name: Option<String>,
    discriminator: Option<String>,
    avatar: Option<String>,
    #[serde(default)]
    bot: bool,
}

impl UserDto {
    fn into_model(self) -> Result<User, GatewayError> {
        Ok(User {
            id: parse_snowflake(&self.id)?,
            username: self.username,
            global_name: self.global_name,
            discriminator: self.discriminator,
            avatar: self.avatar,
            bot: self.bot,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChannelDto {
    id: String,
    name: String,
    guild_id: Option<String>,
}

impl ChannelDto {
    fn into_model(self) -> Result<Channel, GatewayError> {
        let guild_id = match self.guild_id {
            Some(raw) => Some(parse_snowflake(&raw)?),
            None => None,
        };
        Ok(Channel {
            id: parse_snowflake(&self.id)?,
            name: self.name,
            guild_id,
        })
    }
}
