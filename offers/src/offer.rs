use crate::Result;
use derive_more::{Display, From};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use time::OffsetDateTime;

const UNIVERSE_PUBLIC: u8 = 1;
const TYPE_INDIVIDUAL: u8 = 1;
const INSTANCE_DESKTOP: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferId(String);

impl From<&str> for OfferId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl OfferId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A platform account reference, as handed over by the offer source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SteamId {
    pub universe: u8,
    pub account_type: u8,
    pub instance: u32,
    pub account_id: u32,
}

impl SteamId {
    /// An individual account in the public universe.
    pub fn individual(account_id: u32) -> Self {
        Self {
            universe: UNIVERSE_PUBLIC,
            account_type: TYPE_INDIVIDUAL,
            instance: INSTANCE_DESKTOP,
            account_id,
        }
    }

    pub fn from_steam_id64(id: u64) -> Self {
        Self {
            universe: (id >> 56) as u8,
            account_type: ((id >> 52) & 0xF) as u8,
            instance: ((id >> 32) & 0xF_FFFF) as u32,
            account_id: id as u32,
        }
    }

    /// The canonical identifier of the account.
    pub fn steam_id64(&self) -> u64 {
        (u64::from(self.universe) << 56)
            | (u64::from(self.account_type & 0xF) << 52)
            | (u64::from(self.instance & 0xF_FFFF) << 32)
            | u64::from(self.account_id)
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.steam_id64())
    }
}

impl Serialize for SteamId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SteamIdRepr {
    Id64(u64),
    Text(String),
    Parts {
        universe: u8,
        #[serde(rename = "type")]
        account_type: u8,
        instance: u32,
        accountid: u32,
    },
}

impl<'de> Deserialize<'de> for SteamId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match SteamIdRepr::deserialize(deserializer)? {
            SteamIdRepr::Id64(id) => Ok(Self::from_steam_id64(id)),
            SteamIdRepr::Text(text) => text
                .parse()
                .map(Self::from_steam_id64)
                .map_err(serde::de::Error::custom),
            SteamIdRepr::Parts {
                universe,
                account_type,
                instance,
                accountid,
            } => Ok(Self {
                universe,
                account_type,
                instance,
                account_id: accountid,
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OfferState {
    Invalid = 1,
    Active = 2,
    Accepted = 3,
    Countered = 4,
    Expired = 5,
    Canceled = 6,
    Declined = 7,
    InvalidItems = 8,
    CreatedNeedsConfirmation = 9,
    CanceledBySecondFactor = 10,
    InEscrow = 11,
}

impl OfferState {
    fn from_code(code: u8) -> Option<Self> {
        use OfferState::*;
        Some(match code {
            1 => Invalid,
            2 => Active,
            3 => Accepted,
            4 => Countered,
            5 => Expired,
            6 => Canceled,
            7 => Declined,
            8 => InvalidItems,
            9 => CreatedNeedsConfirmation,
            10 => CanceledBySecondFactor,
            11 => InEscrow,
            _ => return None,
        })
    }
}

impl Serialize for OfferState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for OfferState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown offer state {code}")))
    }
}

fn default_amount() -> u64 {
    1
}

/// An inventory item on either side of an offer. Vendor fields this crate
/// doesn't look at are carried through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EconItem {
    pub id: String,
    #[serde(default)]
    pub assetid: String,
    pub appid: u32,
    pub contextid: String,
    #[serde(default = "default_amount")]
    pub amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: OfferId,
    pub partner: SteamId,
    #[serde(default)]
    pub message: String,
    pub state: OfferState,
    #[serde(default)]
    pub items_to_give: Vec<EconItem>,
    #[serde(default)]
    pub items_to_receive: Vec<EconItem>,
    #[serde(default)]
    pub is_our_offer: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires: Option<OffsetDateTime>,
}

/// The one-line view of an offer that is put in front of the operator.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferRecord<'a> {
    id: &'a OfferId,
    partner: String,
    message: &'a str,
    state: OfferState,
    items_to_give: &'a [EconItem],
    items_to_receive: &'a [EconItem],
    is_our_offer: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    created: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    updated: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    expires: Option<OffsetDateTime>,
}

impl<'a> From<&'a Offer> for OfferRecord<'a> {
    fn from(offer: &'a Offer) -> Self {
        Self {
            id: &offer.id,
            partner: offer.partner.steam_id64().to_string(),
            message: &offer.message,
            state: offer.state,
            items_to_give: &offer.items_to_give,
            items_to_receive: &offer.items_to_receive,
            is_our_offer: offer.is_our_offer,
            created: offer.created,
            updated: offer.updated,
            expires: offer.expires,
        }
    }
}

impl OfferRecord<'_> {
    pub fn render(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn offer_json() -> Value {
        json!({
            "id": "4567",
            "partner": {"universe": 1, "type": 1, "instance": 1, "accountid": 46143802},
            "message": "hat for keys",
            "state": 2,
            "itemsToGive": [{
                "id": "111",
                "assetid": "111",
                "appid": 440,
                "contextid": "2",
                "market_name": "Burning Flames Team Captain",
                "app_data": {"quality": 5}
            }],
            "itemsToReceive": [{
                "id": "222",
                "appid": 440,
                "contextid": "2",
                "amount": 3
            }],
            "isOurOffer": false,
            "created": "2024-03-01T12:00:00Z"
        })
    }

    #[test]
    fn resolves_partner_to_steam_id64() {
        assert_eq!(SteamId::individual(46143802).steam_id64(), 76561198006409530);
        let id = SteamId::from_steam_id64(76561198006409530);
        assert_eq!(id, SteamId::individual(46143802));
    }

    #[test]
    fn parses_vendor_offer() {
        let offer: Offer = serde_json::from_value(offer_json()).unwrap();
        assert_eq!(offer.id, OfferId::from("4567"));
        assert_eq!(offer.partner.account_id, 46143802);
        assert_eq!(offer.state, OfferState::Active);
        assert_eq!(offer.items_to_receive[0].amount, 3);
        assert_eq!(offer.items_to_give[0].extra["app_data"], json!({"quality": 5}));
    }

    #[test]
    fn record_carries_canonical_partner_and_vendor_fields() {
        let offer: Offer = serde_json::from_value(offer_json()).unwrap();
        let line = OfferRecord::from(&offer).render().unwrap();
        assert!(!line.contains('\n'));

        let record: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(record["id"], "4567");
        assert_eq!(record["partner"], "76561198006409530");
        assert_eq!(record["state"], 2);
        assert_eq!(record["isOurOffer"], false);
        assert_eq!(
            record["itemsToGive"][0]["market_name"],
            "Burning Flames Team Captain"
        );
        assert_eq!(record["itemsToGive"][0]["app_data"]["quality"], 5);
        assert_eq!(record["created"], "2024-03-01T12:00:00Z");
        assert_eq!(record["expires"], Value::Null);
    }

    #[test]
    fn unknown_state_is_rejected() {
        let mut raw = offer_json();
        raw["state"] = json!(42);
        assert!(serde_json::from_value::<Offer>(raw).is_err());
    }
}
