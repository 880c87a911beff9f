//! Contact form: name, email and message are required; the send is simulated like checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::checkout::{Latency, SimulatedLatency};
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactSubject { Atendimento, Sugestao, Reclamacao, Encomenda, Outro }

impl ContactSubject {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Atendimento => "Atendimento",
            Self::Sugestao => "Sugestão",
            Self::Reclamacao => "Reclamação",
            Self::Encomenda => "Encomenda Especial",
            Self::Outro => "Outro",
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct ContactForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<ContactSubject>,
    #[validate(length(min = 1))]
    pub message: String,
}

/// Acknowledgement returned once the message is accepted.
#[derive(Clone, Debug, Serialize)]
pub struct ContactReceipt {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct ContactService<L = SimulatedLatency> {
    latency: L,
}

impl<L: Latency> ContactService<L> {
    pub fn new(latency: L) -> Self { Self { latency } }

    /// Validates, then waits out the simulated send. Messages are logged, not stored.
    pub async fn submit(&self, form: ContactForm) -> Result<ContactReceipt> {
        form.validate()?;
        let id = Uuid::new_v4();
        info!(%id, subject = ?form.subject, "sending contact message");
        self.latency.wait().await;
        Ok(ContactReceipt { id, received_at: Utc::now() })
    }
}
