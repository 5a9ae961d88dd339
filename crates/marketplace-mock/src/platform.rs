//! Marketplace profiles.
//!
//! One binary serves every marketplace; the profile decides the context
//! path, the default port and the identifier prefixes.

use std::fmt;
use std::str::FromStr;

/// The marketplace being imitated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Naver,
    Kakao,
    Coupang,
    Gmarket,
    Carrot,
}

/// Identifier prefixes of one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPrefixes {
    pub seller: &'static str,
    pub product: &'static str,
    pub option: &'static str,
    pub order: &'static str,
    pub cart: &'static str,
    pub review: &'static str,
    pub notification: &'static str,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Naver,
        Platform::Kakao,
        Platform::Coupang,
        Platform::Gmarket,
        Platform::Carrot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Naver => "naver",
            Platform::Kakao => "kakao",
            Platform::Coupang => "coupang",
            Platform::Gmarket => "gmarket",
            Platform::Carrot => "carrot",
        }
    }

    /// Path every route of this profile is nested under, e.g. `/naver-api`.
    pub fn context_path(&self) -> String {
        format!("/{}-api", self.as_str())
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Platform::Naver => 10000,
            Platform::Kakao => 8082,
            Platform::Coupang => 10001,
            Platform::Gmarket => 10002,
            Platform::Carrot => 10003,
        }
    }

    pub fn prefixes(&self) -> IdPrefixes {
        match self {
            Platform::Naver => IdPrefixes {
                seller: "SELLER",
                product: "PROD",
                option: "OPT",
                order: "ORDER",
                cart: "CART",
                review: "REVIEW",
                notification: "NOTIF",
            },
            Platform::Kakao => IdPrefixes::table([
                "KK_SEL", "KK_PRD", "KK_OPT", "KK_ORD", "KK_CART", "KK_REV", "KK_NOTIF",
            ]),
            Platform::Coupang => IdPrefixes::table([
                "CP_SEL", "CP_PRD", "CP_OPT", "CP_ORD", "CP_CART", "CP_REV", "CP_NOTIF",
            ]),
            Platform::Gmarket => IdPrefixes::table([
                "GM_SEL", "GM_PRD", "GM_OPT", "GM_ORD", "GM_CART", "GM_REV", "GM_NOTIF",
            ]),
            Platform::Carrot => IdPrefixes::table([
                "CR_SEL", "CR_PRD", "CR_OPT", "CR_ORD", "CR_CART", "CR_REV", "CR_NOTIF",
            ]),
        }
    }
}

impl IdPrefixes {
    /// Seller, product, option, order, cart, review, notification.
    const fn table(p: [&'static str; 7]) -> Self {
        Self {
            seller: p[0],
            product: p[1],
            option: p[2],
            order: p[3],
            cart: p[4],
            review: p[5],
            notification: p[6],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown marketplace: {s}"))
    }
}
