//! Wire shapes of the APBD backend REST API

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{WireError, WireResult};

/// `kategoriApbd` record, as listed by `/api/kategori-apbd` and embedded in transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCategory {
    pub id_kategori: i64,
    pub nama_kategori: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kode: Option<String>,
    pub level: i64,
    pub jenis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_parent: Option<i64>,
}

/// `tahunAnggaran` record embedded in transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireYear {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_tahun: Option<i64>,
    pub tahun: i32,
}

/// A decoded `transaksiApbd` record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTransaction {
    pub id_transaksi: i64,
    pub jumlah: Decimal,
    pub id_kategori: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kategori_apbd: Option<WireCategory>,
    pub tahun_anggaran: WireYear,
}

/// Transaction as it arrives, before the amount is checked
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTransaction {
    id_transaksi: i64,
    jumlah: serde_json::Value,
    #[serde(default)]
    id_kategori: Option<i64>,
    #[serde(default)]
    kategori_apbd: Option<WireCategory>,
    tahun_anggaran: WireYear,
}

impl RawTransaction {
    pub(crate) fn decode(self) -> WireResult<WireTransaction> {
        let jumlah = decode_amount(self.id_transaksi, &self.jumlah)?;

        // The embedded category wins over the flat id when both are present
        let id_kategori = match (&self.kategori_apbd, self.id_kategori) {
            (Some(category), _) => category.id_kategori,
            (None, Some(id)) => id,
            (None, None) => {
                return Err(WireError::Malformed {
                    message: format!("transaction {} has no category", self.id_transaksi),
                })
            }
        };

        Ok(WireTransaction {
            id_transaksi: self.id_transaksi,
            jumlah,
            id_kategori,
            kategori_apbd: self.kategori_apbd,
            tahun_anggaran: self.tahun_anggaran,
        })
    }
}

/// Decode `jumlah` from a JSON number or numeric string without an f64 detour.
///
/// JSON numbers keep their source text through serde_json's
/// `arbitrary_precision` feature.
pub fn decode_amount(transaction_id: i64, value: &serde_json::Value) -> WireResult<Decimal> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        other => {
            return Err(WireError::InvalidAmount {
                transaction_id,
                value: other.to_string(),
            })
        }
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| WireError::InvalidAmount {
            transaction_id,
            value: text,
        })
}
