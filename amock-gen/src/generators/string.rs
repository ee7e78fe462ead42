//! Text generators. Realistic values come from the `fake` providers; the rest is built here.

use amock_types::GeneratedValue;
use fake::faker::address::en::{
    BuildingNumber, CityName, CountryCode, CountryName, StateAbbr, StateName, StreetName, ZipCode,
};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::{DomainSuffix, FreeEmail, IPv4, IPv6, Password, Username};
use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;

use super::count_arg;
use crate::{Arity, GenError};

const ROOT_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_+?&*$@/!=#";
const BASE58: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const DEFAULT_PASSWORD_LEN: usize = 16;

const SAFE_COLORS: &[&str] = &[
    "black", "maroon", "green", "navy", "olive", "purple", "teal", "lime", "blue", "silver", "gray", "yellow",
    "fuchsia", "aqua", "white",
];
const COLORS: &[&str] = &[
    "AliceBlue", "Amber", "Aquamarine", "Azure", "Beige", "Bisque", "Black", "Blue", "Brown", "Chartreuse",
    "Chocolate", "Coral", "Crimson", "Cyan", "DarkGreen", "DarkOrange", "Gold", "GoldenRod", "Gray", "Green",
    "HotPink", "Indigo", "Ivory", "Khaki", "Lavender", "LightBlue", "Lime", "Magenta", "Maroon", "MintCream",
    "Navy", "Olive", "Orange", "Orchid", "Peru", "Pink", "Plum", "Purple", "Red", "Salmon", "SeaGreen", "Sienna",
    "Silver", "SkyBlue", "Tan", "Teal", "Tomato", "Turquoise", "Violet", "Wheat", "White", "Yellow",
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextKind {
    Root,
    Name,
    FirstName,
    LastName,
    Email,
    Url,
    Ip,
    Ipv6,
    Username,
    Password,
    Phone,
    Zip,
    Country,
    City,
    Street,
    StreetName,
    State,
    Company,
    Bitcoin,
    Color,
    Word,
    Sentence,
    Paragraph,
}

impl TextKind {
    pub fn from_subtype(s: &str) -> Option<Self> {
        Some(match s {
            "name" => TextKind::Name,
            "firstname" => TextKind::FirstName,
            "lastname" => TextKind::LastName,
            "email" => TextKind::Email,
            "url" => TextKind::Url,
            "ip" => TextKind::Ip,
            "ipv6" => TextKind::Ipv6,
            "username" => TextKind::Username,
            "password" => TextKind::Password,
            "phone" => TextKind::Phone,
            "zip" => TextKind::Zip,
            "country" => TextKind::Country,
            "city" => TextKind::City,
            "street" => TextKind::Street,
            "streetName" => TextKind::StreetName,
            "state" => TextKind::State,
            "company" => TextKind::Company,
            "bitcoin" => TextKind::Bitcoin,
            "color" => TextKind::Color,
            "word" => TextKind::Word,
            "sentence" => TextKind::Sentence,
            "paragraph" => TextKind::Paragraph,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextKind::Root => "root",
            TextKind::Name => "name",
            TextKind::FirstName => "firstname",
            TextKind::LastName => "lastname",
            TextKind::Email => "email",
            TextKind::Url => "url",
            TextKind::Ip => "ip",
            TextKind::Ipv6 => "ipv6",
            TextKind::Username => "username",
            TextKind::Password => "password",
            TextKind::Phone => "phone",
            TextKind::Zip => "zip",
            TextKind::Country => "country",
            TextKind::City => "city",
            TextKind::Street => "street",
            TextKind::StreetName => "streetName",
            TextKind::State => "state",
            TextKind::Company => "company",
            TextKind::Bitcoin => "bitcoin",
            TextKind::Color => "color",
            TextKind::Word => "word",
            TextKind::Sentence => "sentence",
            TextKind::Paragraph => "paragraph",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            TextKind::Root
            | TextKind::Password
            | TextKind::Country
            | TextKind::State
            | TextKind::Color
            | TextKind::Sentence
            | TextKind::Paragraph => Arity::OneOf(&[0, 1]),
            _ => Arity::Exactly(0),
        }
    }
}

pub fn generate<R: Rng + ?Sized>(kind: TextKind, args: &[String], rng: &mut R) -> Result<GeneratedValue, GenError> {
    let variant = args.first().map(|s| s.trim());
    let text: String = match kind {
        TextKind::Root => {
            let len = match count_arg(args, 1)? {
                Some(n) => n,
                None => rng.gen_range(3..=16),
            };
            random_chars(rng, ROOT_CHARSET, len)
        }
        TextKind::Name => Name().fake_with_rng(rng),
        TextKind::FirstName => FirstName().fake_with_rng(rng),
        TextKind::LastName => LastName().fake_with_rng(rng),
        TextKind::Email => FreeEmail().fake_with_rng(rng),
        TextKind::Url => {
            let host: String = Word().fake_with_rng(rng);
            let suffix: String = DomainSuffix().fake_with_rng(rng);
            format!("https://www.{}.{}", host.to_lowercase(), suffix)
        }
        TextKind::Ip => IPv4().fake_with_rng(rng),
        TextKind::Ipv6 => IPv6().fake_with_rng(rng),
        TextKind::Username => Username().fake_with_rng(rng),
        TextKind::Password => {
            let len = count_arg(args, 1)?.unwrap_or(DEFAULT_PASSWORD_LEN);
            Password(len..len + 1).fake_with_rng(rng)
        }
        TextKind::Phone => PhoneNumber().fake_with_rng(rng),
        TextKind::Zip => ZipCode().fake_with_rng(rng),
        TextKind::Country => match variant {
            Some("short") => CountryCode().fake_with_rng(rng),
            _ => CountryName().fake_with_rng(rng),
        },
        TextKind::City => CityName().fake_with_rng(rng),
        TextKind::Street => {
            let number: String = BuildingNumber().fake_with_rng(rng);
            let street: String = StreetName().fake_with_rng(rng);
            format!("{number} {street}")
        }
        TextKind::StreetName => StreetName().fake_with_rng(rng),
        TextKind::State => match variant {
            Some("short") => StateAbbr().fake_with_rng(rng),
            _ => StateName().fake_with_rng(rng),
        },
        TextKind::Company => CompanyName().fake_with_rng(rng),
        TextKind::Bitcoin => bitcoin_address(rng),
        TextKind::Color => color(variant, rng),
        TextKind::Word => Word().fake_with_rng(rng),
        TextKind::Sentence => {
            let words = count_arg(args, 1)?.unwrap_or(3);
            Sentence(words..words + 1).fake_with_rng(rng)
        }
        TextKind::Paragraph => {
            let sentences = count_arg(args, 1)?.unwrap_or(3);
            Paragraph(sentences..sentences + 1).fake_with_rng(rng)
        }
    };
    Ok(GeneratedValue::Text(text))
}

fn random_chars<R: Rng + ?Sized>(rng: &mut R, charset: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect()
}

/// Legacy (`1…`) or script (`3…`) address shape, 26-34 base58 characters.
fn bitcoin_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let prefix = if rng.gen_bool(0.5) { '1' } else { '3' };
    let len = rng.gen_range(25..=33);
    format!("{prefix}{}", random_chars(rng, BASE58, len))
}

fn color<R: Rng + ?Sized>(variant: Option<&str>, rng: &mut R) -> String {
    match variant {
        Some("hex") => format!("#{:06x}", rng.gen_range(0..=0xFF_FFFFu32)),
        Some("safe") => SAFE_COLORS.choose(rng).copied().unwrap_or("black").to_string(),
        Some("rgb") => {
            let [r, g, b]: [u8; 3] = rng.gen();
            format!("rgb({r}, {g}, {b})")
        }
        _ => COLORS.choose(rng).copied().unwrap_or("Black").to_string(),
    }
}
