use std::{fmt::Debug, sync::Arc};

use log::*;
use platform_tools::{
    data_objects::{AuthorizationUrl, OAuthCallbackParams},
    AdapterConfig,
    PlatformAdapter,
    PlatformClient,
    PlatformKind,
};

use crate::{
    db::traits::RoutingDatabase,
    osp_api::{
        errors::OAuthError,
        store_api::{CredentialsUpdate, StoreApi},
    },
};

/// The handler path the platforms redirect back to once the merchant approves the install.
pub fn oauth_callback_path(platform: PlatformKind) -> String {
    format!("/api/oauth/{platform}/callback")
}

/// `OAuthApi` runs the install handshake with a platform and stores the credentials it yields.
pub struct OAuthApi<B> {
    store: StoreApi<B>,
    config: Arc<AdapterConfig>,
}

impl<B> Debug for OAuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OAuthApi")
    }
}

impl<B> OAuthApi<B> {
    pub fn new(db: B, config: Arc<AdapterConfig>) -> Self {
        Self { store: StoreApi::new(db), config }
    }

    fn callback_url(&self, platform: PlatformKind) -> String {
        self.config.callback_url(&oauth_callback_path(platform))
    }

    /// The vendor URL that asks the merchant of `domain` to approve the install.
    pub fn authorize_url(&self, platform: PlatformKind, domain: &str) -> Result<AuthorizationUrl, OAuthError> {
        let client = PlatformClient::for_oauth(platform, domain, Arc::clone(&self.config))?;
        let url = client.oauth_url(domain, &self.callback_url(platform))?;
        debug!("🔑️ Issued {platform} authorize URL for {domain}");
        Ok(url)
    }
}

impl<B> OAuthApi<B>
where B: RoutingDatabase
{
    /// Verifies the callback, exchanges it for credentials and applies them to every record for the installed store.
    ///
    /// Verification happens before any network call, so a forged callback never reaches the token endpoint.
    pub async fn complete(
        &self,
        platform: PlatformKind,
        params: &OAuthCallbackParams,
    ) -> Result<CredentialsUpdate, OAuthError> {
        let domain = params.shop.as_deref().or(params.context.as_deref()).ok_or(OAuthError::MissingDomain)?;
        let client = PlatformClient::for_oauth(platform, domain, Arc::clone(&self.config))?;
        let grant = client.oauth_callback(params, &self.callback_url(platform)).await.map_err(|e| {
            warn!("🔑️ {platform} OAuth callback for {domain} rejected. {e}");
            e
        })?;
        Ok(self.store.apply_access_grant(platform, grant).await?)
    }
}
