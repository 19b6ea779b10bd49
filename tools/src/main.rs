// Licensed under the Apache-2.0 license

use anyhow::{anyhow, Context, Result};
use certattr::{
    add::AttributeValue,
    compare::compare_attribute_lists,
    field_id,
    lookup::{attribute_fields, attribute_ids, find_attribute},
    table::{check_tables, field_id_to_attribute},
    write::encode_attributes,
    read_attributes, AttributeConfig, AttributeField, AttributeKind, AttributeList,
    ComplianceLevel, EncodingOptions, FieldFlags, FieldId, FieldValue, ObjectKind,
};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use pem::{encode_config, EncodeConfig, LineEnding, Pem};
use std::{fs, path::PathBuf};

const PEM_LABEL: &str = "CERTIFICATE EXTENSIONS";
const MAX_ENCODED_SIZE: usize = 4096;

#[derive(ValueEnum, Clone, Debug, Copy)]
pub enum Object {
    Certificate,
    AttributeCertificate,
    Crl,
    CrlEntry,
    /// PKCS #10 request
    CertRequest,
    CrmfRequest,
    RevocationRequest,
    OcspRequest,
    OcspResponse,
    RtcsRequest,
    RtcsResponse,
    PkiUser,
    /// CMS signed attributes
    Cms,
}

impl From<Object> for ObjectKind {
    fn from(object: Object) -> Self {
        match object {
            Object::Certificate => ObjectKind::Certificate,
            Object::AttributeCertificate => ObjectKind::AttributeCertificate,
            Object::Crl => ObjectKind::Crl,
            Object::CrlEntry => ObjectKind::CrlEntry,
            Object::CertRequest => ObjectKind::CertRequest,
            Object::CrmfRequest => ObjectKind::CrmfRequest,
            Object::RevocationRequest => ObjectKind::RevocationRequest,
            Object::OcspRequest => ObjectKind::OcspRequest,
            Object::OcspResponse => ObjectKind::OcspResponse,
            Object::RtcsRequest => ObjectKind::RtcsRequest,
            Object::RtcsResponse => ObjectKind::RtcsResponse,
            Object::PkiUser => ObjectKind::PkiUser,
            Object::Cms => ObjectKind::CmsAttributes,
        }
    }
}

#[derive(ValueEnum, Clone, Debug, Copy)]
pub enum Compliance {
    Oblivious,
    Reduced,
    Standard,
    PkixPartial,
    PkixFull,
}

impl From<Compliance> for ComplianceLevel {
    fn from(compliance: Compliance) -> Self {
        match compliance {
            Compliance::Oblivious => ComplianceLevel::Oblivious,
            Compliance::Reduced => ComplianceLevel::Reduced,
            Compliance::Standard => ComplianceLevel::Standard,
            Compliance::PkixPartial => ComplianceLevel::PkixPartial,
            Compliance::PkixFull => ComplianceLevel::PkixFull,
        }
    }
}

/// Encodes and decodes X.509 extension and CMS attribute blocks.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log decoder and encoder decisions.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a DER or PEM attribute block and list its fields.
    Dump {
        /// File holding the block, wrapped as it appears in the object.
        input: PathBuf,
        /// Object the block was taken from.
        #[arg(long, short, value_enum, default_value_t = Object::Certificate)]
        object: Object,
        /// Attributes above this level are kept undecoded.
        #[arg(long, value_enum, default_value_t = Compliance::Standard)]
        compliance: Compliance,
        /// Keep unrecognised critical extensions instead of rejecting them.
        #[arg(long)]
        allow_unknown_critical: bool,
    },
    /// Encode a sample attribute set for an object.
    Encode {
        #[arg(long, short, value_enum, default_value_t = Object::Certificate)]
        object: Object,
        /// Write PEM rather than hex.
        #[arg(long)]
        pem: bool,
        /// Write to a file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Check the attribute tables and round-trip the sample sets.
    Selftest,
}

fn add(list: &mut AttributeList, kind: AttributeKind, field_id: FieldId, sub_field_id: FieldId, value: AttributeValue) -> Result<()> {
    list.add_field(kind, field_id, sub_field_id, value, FieldFlags::empty())
        .map_err(|e| anyhow!("Error adding field {}: {e:?}", field_id.0))?;
    Ok(())
}

/// A representative attribute set for `object`
fn sample_attributes(object: ObjectKind) -> Result<AttributeList> {
    let kind = object.attribute_kind();
    let mut list = AttributeList::new();
    let none = FieldId::NONE;

    match object {
        ObjectKind::CmsAttributes => {
            add(&mut list, kind, field_id::CMS_CONTENT_TYPE, none, AttributeValue::Integer(field_id::CONTENT_DATA))?;
            add(&mut list, kind, field_id::CMS_MESSAGE_DIGEST, none, AttributeValue::Bytes(&[0xA5; 32]))?;
            add(&mut list, kind, field_id::CMS_SIGNING_TIME, none, AttributeValue::Time(1_700_000_000))?;
            add(&mut list, kind, field_id::SMIMECAP_AES128, none, AttributeValue::Unused)?;
            add(&mut list, kind, field_id::SMIMECAP_PREFER_SIGNED_DATA, none, AttributeValue::Unused)?;
        }
        ObjectKind::Crl => {
            add(&mut list, kind, field_id::CRL_NUMBER, none, AttributeValue::Integer(1))?;
        }
        ObjectKind::CrlEntry => {
            add(&mut list, kind, field_id::CRL_REASON, none, AttributeValue::Integer(field_id::CRL_REASON_KEY_COMPROMISE))?;
            add(&mut list, kind, field_id::INVALIDITY_DATE, none, AttributeValue::Time(1_700_000_000))?;
        }
        _ => {
            add(&mut list, kind, field_id::CA, none, AttributeValue::Integer(1))?;
            add(&mut list, kind, field_id::PATH_LEN_CONSTRAINT, none, AttributeValue::Integer(0))?;
            // keyCertSign | cRLSign
            add(&mut list, kind, field_id::KEY_USAGE, none, AttributeValue::Integer(0x60))?;
            add(&mut list, kind, field_id::SUBJECT_ALT_NAME, field_id::DNS_NAME, AttributeValue::Bytes(b"ca.example.com"))?;
            add(
                &mut list,
                kind,
                field_id::CRLDIST_FULL_NAME,
                field_id::UNIFORM_RESOURCE_IDENTIFIER,
                AttributeValue::Bytes(b"http://crl.example.com/ca.crl"),
            )?;
            if object == ObjectKind::CertRequest {
                add(&mut list, kind, field_id::CHALLENGE_PASSWORD, none, AttributeValue::Bytes(b"password"))?;
            }
        }
    }

    Ok(list)
}

fn encode(list: &mut AttributeList, object: ObjectKind) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; MAX_ENCODED_SIZE];
    let len = encode_attributes(list, object, &AttributeConfig::default(), &mut buffer)
        .map_err(|e| anyhow!("Error encoding attributes: {e:?}"))?;
    buffer.truncate(len);
    Ok(buffer)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn describe(kind: AttributeKind, field: &AttributeField) -> &'static str {
    field_id_to_attribute(kind, field.field_id, field.sub_field_id)
        .map(|(entry, _)| entry.entry().description)
        .unwrap_or("?")
}

fn print_field(kind: AttributeKind, field: &AttributeField) {
    let value = match &field.value {
        FieldValue::Integer(value) => format!("{value}"),
        FieldValue::Time(time) => format!("time {time}"),
        FieldValue::Dn(dn) => format!("dn {}", to_hex(dn.as_bytes())),
        FieldValue::Bytes(bytes) => match core::str::from_utf8(bytes) {
            Ok(text) if !text.chars().any(char::is_control) => format!("\"{text}\""),
            _ => to_hex(bytes),
        },
    };
    let mut flags = String::new();
    if field.is_critical() {
        flags.push_str(" critical");
    }
    if field.flags.contains(FieldFlags::IGNORED) {
        flags.push_str(" ignored");
    }
    println!("    {} = {value}{flags}", describe(kind, field));
}

fn dump(input: &PathBuf, object: ObjectKind, config: &AttributeConfig) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let der = if data.starts_with(b"-----BEGIN") {
        pem::parse(&data)?.contents().to_vec()
    } else {
        data
    };
    debug!("Decoding {} bytes as {object:?}", der.len());

    let kind = object.attribute_kind();
    let list = read_attributes(kind, &der, object, config)
        .map_err(|e| anyhow!("Error decoding attributes: {e:?}"))?;

    for attribute_id in attribute_ids(&list) {
        let head = find_attribute(&list, attribute_id)
            .ok_or_else(|| anyhow!("Attribute {} vanished", attribute_id.0))?;
        let name = field_id_to_attribute(kind, attribute_id, FieldId::NONE)
            .map(|(entry, _)| entry.entry().description)
            .unwrap_or("?");
        println!("{name}");
        for (_, field) in attribute_fields(&list, head).map_err(|e| anyhow!("{e:?}"))? {
            print_field(kind, field);
        }
    }
    for (_, field) in list.iter().filter(|(_, field)| field.is_blob()) {
        let oid = field.oid.as_deref().unwrap_or_default();
        let payload = field.value.as_bytes().unwrap_or_default();
        println!("unrecognised {}", to_hex(oid));
        println!(
            "    {}{}",
            to_hex(payload),
            if field.is_critical() { " critical" } else { "" }
        );
    }

    Ok(())
}

fn selftest() -> Result<()> {
    check_tables().map_err(|e| anyhow!("Table check failed: {e:?}"))?;
    info!("Tables are consistent");

    for object in [
        ObjectKind::Certificate,
        ObjectKind::CertRequest,
        ObjectKind::CrmfRequest,
        ObjectKind::Crl,
        ObjectKind::CrlEntry,
        ObjectKind::CmsAttributes,
    ] {
        let mut list = sample_attributes(object)?;
        let der = encode(&mut list, object)?;
        let decoded = read_attributes(object.attribute_kind(), &der, object, &AttributeConfig::default())
            .map_err(|e| anyhow!("Error decoding {object:?} sample: {e:?}"))?;
        if !compare_attribute_lists(&list, &decoded) {
            return Err(anyhow!("{object:?} sample didn't survive a round trip"));
        }
        info!("{object:?}: {} bytes", der.len());
    }
    println!("Selftest passed");

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match args.command {
        Command::Dump {
            input,
            object,
            compliance,
            allow_unknown_critical,
        } => {
            let options = if allow_unknown_critical {
                EncodingOptions::ALLOW_UNKNOWN_CRITICAL
            } else {
                EncodingOptions::empty()
            };
            dump(&input, object.into(), &AttributeConfig::new(options, compliance.into()))
        }
        Command::Encode {
            object,
            pem,
            output,
        } => {
            let object = object.into();
            let mut list = sample_attributes(object)?;
            let der = encode(&mut list, object)?;
            let text = if pem {
                encode_config(
                    &Pem::new(PEM_LABEL, der),
                    EncodeConfig {
                        line_ending: LineEnding::LF,
                    },
                )
            } else {
                to_hex(&der) + "\n"
            };
            match output {
                Some(path) => fs::write(&path, text)
                    .with_context(|| format!("Failed to write {}", path.display())),
                None => {
                    print!("{text}");
                    Ok(())
                }
            }
        }
        Command::Selftest => selftest(),
    }
}
