//! [`SecretStore`] implementation backed by AWS SSM Parameter Store.
//!
//! Values are stored as `SecureString` parameters, so they are encrypted at
//! rest with the account's KMS key and decrypted server-side on `get` as
//! long as the process has `ssm:GetParameter` and the corresponding KMS
//! permissions.

use aws_sdk_ssm::types::{ParameterStringFilter, ParameterType};

use super::SecretStore;
use crate::error::{Error, Result};
use crate::name;

pub struct SsmStore {
    client: aws_sdk_ssm::Client,
    prefix: String,
}

impl SsmStore {
    /// Creates a store bound to the namespace `prefix`, using an already
    /// loaded AWS configuration (profile, region, credentials).
    pub fn new(config: &aws_config::SdkConfig, prefix: &str) -> Self {
        Self {
            client: aws_sdk_ssm::Client::new(config),
            prefix: prefix.to_string(),
        }
    }

    fn name_filter(option: &str, value: String) -> Result<ParameterStringFilter> {
        ParameterStringFilter::builder()
            .key("Name")
            .option(option)
            .values(value)
            .build()
            .map_err(Error::remote)
    }
}

/// One page of a paginated listing.
pub(crate) struct Page {
    pub names: Vec<String>,
    pub next_token: Option<String>,
}

/// Walks a paginated listing to exhaustion, accumulating names.
///
/// `fetch` is called with the continuation token from the previous page
/// (`None` for the first request) until the store stops returning one.
/// An explicit loop, so arbitrarily large parameter stores cannot blow
/// the call stack. Any page failure aborts the whole walk.
pub(crate) async fn drain_pages<F, Fut>(mut fetch: F) -> Result<Vec<String>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<Page>>,
{
    let mut names = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = fetch(token.take()).await?;
        names.extend(page.names);
        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    Ok(names)
}

#[async_trait::async_trait]
impl SecretStore for SsmStore {
    async fn list(&self) -> Result<Vec<String>> {
        let client = self.client.clone();
        let namespace = name::namespace(&self.prefix);

        let qualified = drain_pages(move |token| {
            let client = client.clone();
            let namespace = namespace.clone();
            async move {
                let filter = SsmStore::name_filter("BeginsWith", namespace)?;
                let resp = client
                    .describe_parameters()
                    .parameter_filters(filter)
                    .set_next_token(token)
                    .send()
                    .await
                    .map_err(Error::remote)?;
                Ok(Page {
                    names: resp
                        .parameters
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(|p| p.name)
                        .collect(),
                    next_token: resp.next_token,
                })
            }
        })
        .await?;

        Ok(qualified
            .iter()
            .filter_map(|n| name::strip(&self.prefix, n))
            .collect())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let filter = Self::name_filter("Equals", name::qualified(&self.prefix, key))?;
        let resp = self
            .client
            .describe_parameters()
            .parameter_filters(filter)
            .send()
            .await
            .map_err(Error::remote)?;
        Ok(!resp.parameters().is_empty())
    }

    async fn get(&self, key: &str, decrypt: bool) -> Result<Vec<u8>> {
        let qualified = name::qualified(&self.prefix, key);
        let resp = self
            .client
            .get_parameter()
            .name(&qualified)
            .with_decryption(decrypt)
            .send()
            .await
            .map_err(Error::remote)?;

        let value = resp
            .parameter
            .and_then(|p| p.value)
            .ok_or_else(|| Error::Remote(format!("parameter '{qualified}' has no value").into()))?;
        Ok(value.into_bytes())
    }

    async fn store(&self, key: &str, data: &[u8], overwrite: bool) -> Result<()> {
        // PEM material is text; SSM parameter values are strings.
        let value = std::str::from_utf8(data).map_err(|_| Error::NotUtf8)?;
        self.client
            .put_parameter()
            .r#type(ParameterType::SecureString)
            .name(name::qualified(&self.prefix, key))
            .value(value)
            .overwrite(overwrite)
            .send()
            .await
            .map_err(Error::remote)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.client
            .delete_parameter()
            .name(name::qualified(&self.prefix, key))
            .send()
            .await
            .map_err(Error::remote)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn page(names: &[&str], next_token: Option<&str>) -> Page {
        Page {
            names: names.iter().map(|s| s.to_string()).collect(),
            next_token: next_token.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_drain_pages_single_page() {
        let mut pages = VecDeque::from([page(&["a", "b"], None)]);
        let names = drain_pages(move |_| {
            let page = pages.pop_front().expect("fetched past final page");
            async move { Ok(page) }
        })
        .await
        .unwrap();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_drain_pages_aggregates_five_keys_across_two_item_pages() {
        // 5 keys split into 2-item pages: all 5 returned, no duplicates
        let mut pages = VecDeque::from([
            page(&["k1", "k2"], Some("t1")),
            page(&["k3", "k4"], Some("t2")),
            page(&["k5"], None),
        ]);
        let mut expected_tokens = VecDeque::from([None, Some("t1".to_string()), Some("t2".to_string())]);

        let names = drain_pages(move |token| {
            assert_eq!(token, expected_tokens.pop_front().expect("extra fetch"));
            let page = pages.pop_front().expect("fetched past final page");
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(names, vec!["k1", "k2", "k3", "k4", "k5"]);
    }

    #[tokio::test]
    async fn test_drain_pages_empty_listing() {
        let mut pages = VecDeque::from([page(&[], None)]);
        let names = drain_pages(move |_| {
            let page = pages.pop_front().expect("fetched past final page");
            async move { Ok(page) }
        })
        .await
        .unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_drain_pages_aborts_on_failed_page() {
        // first page succeeds, second fails: no partial result comes back
        let mut pages = VecDeque::from([Ok(page(&["k1", "k2"], Some("t1"))), Err(())]);
        let result = drain_pages(move |_| {
            let page = pages.pop_front().expect("fetched past final page");
            async move {
                page.map_err(|()| Error::Remote("throttled by remote store".to_string().into()))
            }
        })
        .await;

        assert!(matches!(result, Err(Error::Remote(_))));
    }
}
