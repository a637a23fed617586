use super::{SmartWalletAccountRecord, SmartWalletError, SmartWalletSdk};

use tracing::{debug, info};
use zeroize::Zeroizing;

/// Owned connection to the smart-wallet SDK.
///
/// The handle remembers the credentials of the live session. Connecting again with the same
/// credentials is a no-op; different credentials re-initialise the SDK.
pub struct SmartWalletConnection {
	sdk: Box<dyn SmartWalletSdk>,
	credentials: Option<Zeroizing<String>>,
}

impl SmartWalletConnection {
	pub fn new(sdk: Box<dyn SmartWalletSdk>) -> Self {
		Self {
			sdk,
			credentials: None,
		}
	}

	pub fn is_connected(&self) -> bool {
		self.credentials.is_some()
	}

	/// Connect with the given private key. Returns `true` when a new session was initialised.
	pub async fn connect(&mut self, private_key: &str) -> Result<bool, SmartWalletError> {
		if let Some(current) = &self.credentials {
			if current.as_str() == private_key {
				debug!("Smart wallet SDK already connected with current credentials");
				return Ok(false);
			}
			info!("Smart wallet credentials changed, reconnecting");
		}

		// a failed init leaves the handle disconnected
		self.credentials = None;
		self.sdk.init(private_key).await?;
		self.credentials = Some(Zeroizing::new(private_key.to_string()));

		info!("Smart wallet SDK initialised");
		Ok(true)
	}

	pub fn disconnect(&mut self) {
		self.credentials = None;
	}

	pub async fn accounts(&self) -> Result<Vec<SmartWalletAccountRecord>, SmartWalletError> {
		if !self.is_connected() {
			return Err(SmartWalletError::NotConnected);
		}
		self.sdk.get_accounts().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	};

	struct CountingSdk {
		inits: Arc<AtomicUsize>,
		fail: bool,
	}

	#[async_trait::async_trait]
	impl SmartWalletSdk for CountingSdk {
		async fn init(&mut self, _private_key: &str) -> Result<(), SmartWalletError> {
			if self.fail {
				return Err(SmartWalletError::ConnectionError("offline".into()));
			}
			self.inits.fetch_add(1, Ordering::SeqCst);
			Ok(())
		}

		async fn get_accounts(&self) -> Result<Vec<SmartWalletAccountRecord>, SmartWalletError> {
			Ok(Vec::new())
		}
	}

	fn connection(fail: bool) -> (SmartWalletConnection, Arc<AtomicUsize>) {
		let inits = Arc::new(AtomicUsize::new(0));
		let sdk = CountingSdk {
			inits: inits.clone(),
			fail,
		};
		(SmartWalletConnection::new(Box::new(sdk)), inits)
	}

	#[tokio::test]
	async fn reconnects_only_when_credentials_change() {
		let (mut connection, inits) = connection(false);

		assert!(connection.connect("0xkey").await.unwrap());
		assert!(!connection.connect("0xkey").await.unwrap());
		assert!(connection.connect("0xother").await.unwrap());

		assert_eq!(inits.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn disconnect_forces_reinitialisation() {
		let (mut connection, inits) = connection(false);

		connection.connect("0xkey").await.unwrap();
		connection.disconnect();
		assert!(!connection.is_connected());
		assert!(matches!(
			connection.accounts().await,
			Err(SmartWalletError::NotConnected)
		));

		assert!(connection.connect("0xkey").await.unwrap());
		assert_eq!(inits.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn failed_init_leaves_handle_disconnected() {
		let (mut connection, _) = connection(true);

		assert!(connection.connect("0xkey").await.is_err());
		assert!(!connection.is_connected());
		assert!(matches!(
			connection.accounts().await,
			Err(SmartWalletError::NotConnected)
		));
	}
}
