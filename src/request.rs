//! Signature strings of the XML interface requests.
//!
//! Each request is authorized by signing a concatenation of some of its
//! fields together with the request number. Transport and XML marshaling
//! are left to the caller.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::error::SignerError;
use crate::signer::MessageSigner;

/// Request number: `YYYYMMDDhhmmss` followed by three millisecond digits.
pub fn request_number<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y%m%d%H%M%S%3f").to_string()
}

/// Request number for the current local time.
pub fn current_request_number() -> String {
    request_number(&chrono::Local::now())
}

/// A request whose authorization covers some of its fields.
pub trait SignatureSource {
    /// Name of the interface operation.
    fn operation(&self) -> &'static str;

    fn signature_string(&self, reqn: &str) -> String;
}

/// Purse balances of a WMID.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceRequest {
    pub wmid: String,
}

impl SignatureSource for BalanceRequest {
    fn operation(&self) -> &'static str {
        "Purses"
    }

    fn signature_string(&self, reqn: &str) -> String {
        format!("{}{reqn}", self.wmid)
    }
}

/// Operation history of a purse.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryRequest {
    pub purse: String,
    pub wmtranid: String,
    pub tranid: i64,
    pub wminvid: String,
    pub orderid: String,
    pub datestart: String,
    pub datefinish: String,
}

impl SignatureSource for HistoryRequest {
    fn operation(&self) -> &'static str {
        "Operations"
    }

    fn signature_string(&self, reqn: &str) -> String {
        format!("{}{reqn}", self.purse)
    }
}

/// Transfer between purses.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransferRequest {
    pub tranid: i64,
    pub purse_src: String,
    pub purse_dest: String,
    pub amount: String,
    pub period: i32,
    pub pcode: String,
    pub desc: String,
    pub wminvid: i64,
}

impl SignatureSource for TransferRequest {
    fn operation(&self) -> &'static str {
        "Trans"
    }

    fn signature_string(&self, reqn: &str) -> String {
        format!(
            "{reqn}{}{}{}{}{}{}{}{}",
            self.tranid,
            self.purse_src,
            self.purse_dest,
            self.amount,
            self.period,
            self.pcode,
            self.desc,
            self.wminvid
        )
    }
}

/// A request body together with its authorization, ready to be embedded in
/// XML.
#[derive(Debug, Clone, Serialize)]
pub struct SignedRequest<T> {
    pub operation: &'static str,
    pub reqn: String,
    pub wmid: String,
    pub signature_string: String,
    pub sign: String,
    pub request: T,
}

impl<T: SignatureSource + Serialize> SignedRequest<T> {
    pub fn new(
        signer: &dyn MessageSigner,
        wmid: &str,
        reqn: String,
        request: T,
    ) -> Result<Self, SignerError> {
        let signature_string = request.signature_string(&reqn);
        let sign = signer.sign(&signature_string)?;

        Ok(Self {
            operation: request.operation(),
            reqn,
            wmid: wmid.to_string(),
            signature_string,
            sign,
            request,
        })
    }
}
