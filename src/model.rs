use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Quotation,
    Proforma,
    Invoice,
}

impl DocumentType {
    pub fn title(self) -> &'static str {
        match self {
            DocumentType::Quotation => "QUOTATION",
            DocumentType::Proforma => "PROFORMA INVOICE",
            DocumentType::Invoice => "TAX INVOICE",
        }
    }

    pub fn number_label(self) -> &'static str {
        match self {
            DocumentType::Quotation => "Quotation #",
            DocumentType::Proforma => "Proforma #",
            DocumentType::Invoice => "Invoice #",
        }
    }

    /// Prefix used by the sequential numbering scheme (`QUT/2024-2025/001`).
    pub fn number_prefix(self) -> &'static str {
        match self {
            DocumentType::Quotation => "QUT",
            DocumentType::Proforma => "PFI",
            DocumentType::Invoice => "INV",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Quotation => "quotation",
            DocumentType::Proforma => "proforma",
            DocumentType::Invoice => "invoice",
        }
    }

    pub(crate) fn allows_bank_details(self) -> bool {
        matches!(self, DocumentType::Proforma | DocumentType::Invoice)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetails {
    pub company_name: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    pub contact_number: String,
    pub email: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub customer_name: String,
    pub customer_company_name: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    pub contact_number: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub s_no: u32,
    pub particulars: String,
    #[serde(default)]
    pub hsn_code: String,
    pub quantity: f64,
    pub unit: String,
    pub rate: f64,
    #[serde(default)]
    pub cgst: f64,
    #[serde(default)]
    pub sgst: f64,
    #[serde(default)]
    pub igst: f64,
    /// `quantity * rate`, precomputed by the caller.
    pub amount: f64,
}

impl LineItem {
    /// Tax amount for a percentage rate applied to this item's taxable amount.
    pub fn tax_amount(&self, rate_percent: f64) -> f64 {
        self.amount * rate_percent / 100.0
    }

    /// Taxable amount plus all three tax amounts, whichever columns are shown.
    pub fn total_with_tax(&self) -> f64 {
        self.amount + self.tax_amount(self.cgst) + self.tax_amount(self.sgst) + self.tax_amount(self.igst)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub taxable_amount: f64,
    #[serde(rename = "totalCGST", default)]
    pub total_cgst: f64,
    #[serde(rename = "totalSGST", default)]
    pub total_sgst: f64,
    #[serde(rename = "totalIGST", default)]
    pub total_igst: f64,
    pub grand_total: f64,
}

impl Totals {
    /// Aggregate the way the entry forms do: sum of amounts and per-item taxes.
    pub fn from_items(items: &[LineItem]) -> Self {
        let mut t = Totals::default();
        for item in items {
            t.taxable_amount += item.amount;
            t.total_cgst += item.tax_amount(item.cgst);
            t.total_sgst += item.tax_amount(item.sgst);
            t.total_igst += item.tax_amount(item.igst);
        }
        t.grand_total = t.taxable_amount + t.total_cgst + t.total_sgst + t.total_igst;
        t
    }

    /// Names of the aggregates that differ from `other` by more than `tolerance`.
    pub fn mismatches(&self, other: &Totals, tolerance: f64) -> Vec<&'static str> {
        [
            ("taxableAmount", self.taxable_amount, other.taxable_amount),
            ("totalCGST", self.total_cgst, other.total_cgst),
            ("totalSGST", self.total_sgst, other.total_sgst),
            ("totalIGST", self.total_igst, other.total_igst),
            ("grandTotal", self.grand_total, other.grand_total),
        ]
        .into_iter()
        .filter(|&(_, a, b)| (a - b).abs() > tolerance)
        .map(|(name, _, _)| name)
        .collect()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    #[serde(default)]
    pub beneficiary_name: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub ifsc_code: String,
    #[serde(default)]
    pub branch: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoDetails {
    #[serde(default)]
    pub po_number: String,
    #[serde(default, with = "date_format::option")]
    pub po_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchDetails {
    #[serde(default)]
    pub delivery_type: String,
    #[serde(default, with = "date_format::option")]
    pub dispatch_date: Option<NaiveDate>,
    #[serde(default)]
    pub courier_name: String,
}

impl DispatchDetails {
    pub fn is_empty(&self) -> bool {
        self.delivery_type.is_empty() && self.dispatch_date.is_none() && self.courier_name.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRenderRequest {
    pub document_type: DocumentType,
    pub document_number: String,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    pub company_details: CompanyDetails,
    pub customer_details: CustomerDetails,
    pub items: Vec<LineItem>,
    pub totals: Totals,
    #[serde(default)]
    pub bank_details: Option<BankDetails>,
    #[serde(default)]
    pub po_details: Option<PoDetails>,
    #[serde(default)]
    pub dispatch_details: Option<DispatchDetails>,
}

impl DocumentRenderRequest {
    pub fn from_json(data: &[u8]) -> Result<Self, crate::Error> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Bank panel is shown for proforma/invoice documents that name a bank.
    pub fn shows_bank_panel(&self) -> bool {
        self.document_type.allows_bank_details()
            && self
                .bank_details
                .as_ref()
                .is_some_and(|b| !b.bank_name.trim().is_empty())
    }

    /// Dispatch panel is shown for invoices with at least one dispatch field.
    pub fn shows_dispatch_panel(&self) -> bool {
        self.document_type == DocumentType::Invoice
            && self.dispatch_details.as_ref().is_some_and(|d| !d.is_empty())
    }

    pub(crate) fn po_line(&self) -> Option<&PoDetails> {
        if self.document_type != DocumentType::Invoice {
            return None;
        }
        self.po_details
            .as_ref()
            .filter(|po| !po.po_number.is_empty() || po.po_date.is_some())
    }
}

/// Rendered form of every date on the document.
pub(crate) fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Dates arrive either as plain `YYYY-MM-DD` or as full RFC 3339 timestamps.
mod date_format {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn parse(s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("unrecognised date: {raw}")))
    }

    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => super::serialize(d, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
            let raw: Option<String> = Option::deserialize(d)?;
            match raw.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => super::parse(s)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date: {s}"))),
            }
        }
    }
}
