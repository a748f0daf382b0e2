//! Capability Report
//!
//!     Assembles what a drive-test engineer wants from one attach: the network the device was on,
//!     what the network asked for, what the device answered per radio access technology, and the
//!     EN-DC band combinations it declared.
//!
//!     Every piece is located the same way: select the message instances that carry a marker,
//!     then read fields, subtrees or sibling lists out of those instances only. Nothing here
//!     knows about columns or line shapes; that is [LineRecord]'s job.
//!
//! Required and Optional Sections
//!
//!     A report without the capability enquiry is meaningless, so a dump without
//!     `ue-CapabilityRequest` fails with [ExtractError::NotFound]. Everything else is optional:
//!     a device that declares no MR-DC parameters simply has no EN-DC combinations, a missing
//!     RAT container leaves that RAT out of the report.
//!
//! RAT Containers
//!
//!     `ue-CapabilityRAT-ContainerList` is a sibling list. Devices often answer several enquiries
//!     in one log with the same containers; a container is dropped when its body (from its
//!     `rat-Type` line on) was already seen. The first container of each type wins.

use crate::capscan::combos::ComboEncoder;
use crate::capscan::error::{ExtractError, ExtractResult};
use crate::capscan::fields::{collect_fields, collect_nested_fields, FieldMap};
use crate::capscan::line::Line;
use crate::capscan::locating::{find_instances_containing, find_occurrences};
use crate::capscan::record::LineRecord;
use crate::capscan::siblings::partition_siblings;
use crate::capscan::subtree::{extract_subtree, find_blocks, Subtree};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const CAPABILITY_REQUEST_MARKER: &str = "ue-CapabilityRequest";
pub const CAPABILITY_INFORMATION_MARKER: &str = "ueCapabilityInformation";
pub const CONTAINER_LIST_MARKER: &str = "ue-CapabilityRAT-ContainerList";
pub const SUPPORTED_BANDS_MARKER: &str = "supportedBandListEUTRA";

const MOBILE_COUNTRY_CODE: &str = "Mobile Country Code";
const MOBILE_NETWORK_CODE: &str = "Mobile Network Code";
const RAT_TYPE_FIELD: &str = "rat-Type";

static IMS_DOMAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ims\.mnc(?P<mnc>\d+)\.mcc(?P<mcc>\d+)").unwrap());

/// Network the dump was recorded on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkIdentity {
    pub mcc: Option<String>,
    pub mnc: Option<String>,
}

fn first_payload(lines: &[Line], marker: &str) -> Option<String> {
    find_occurrences(lines, marker)
        .into_iter()
        .find_map(|position| LineRecord::parse(&lines[position]).payload().map(str::to_string))
}

/// MCC and MNC from the NAS identity fields, or from an IMS domain name when NAS has none.
pub fn network_identity(lines: &[Line]) -> NetworkIdentity {
    let mut identity = NetworkIdentity {
        mcc: first_payload(lines, MOBILE_COUNTRY_CODE),
        mnc: first_payload(lines, MOBILE_NETWORK_CODE),
    };

    if identity.mcc.is_none() || identity.mnc.is_none() {
        log::debug!("no NAS network identity, looking for an IMS domain");
        if let Some(caps) = lines.iter().find_map(|line| IMS_DOMAIN.captures(line.text())) {
            identity.mcc.get_or_insert_with(|| caps["mcc"].to_string());
            identity.mnc.get_or_insert_with(|| caps["mnc"].to_string());
        }
    }
    log::debug!("network identity: {:?}", identity);
    identity
}

/// What the network asked the device to report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapabilityRequest {
    pub rat_types: Vec<String>,
    pub lte_ca_bands: Vec<u16>,
    pub lte_mrdc_bands: Vec<u16>,
    pub nr_mrdc_bands: Vec<u16>,
}

fn push_unique<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if !values.contains(&value) {
        values.push(value);
    }
}

/// Requested RAT types and bands, over every enquiry in the dump, in first-seen order.
pub fn capability_request(lines: &[Line]) -> ExtractResult<CapabilityRequest> {
    let instances = find_instances_containing(lines, CAPABILITY_REQUEST_MARKER);
    if instances.is_empty() {
        return Err(ExtractError::not_found(CAPABILITY_REQUEST_MARKER));
    }

    let mut request = CapabilityRequest::default();
    for record in instances
        .iter()
        .flat_map(|instance| instance.iter())
        .map(LineRecord::parse)
    {
        let band = || record.payload().and_then(|value| value.parse::<u16>().ok());
        if record.key.contains("RAT-Type") {
            if let Some(rat) = record.payload() {
                push_unique(&mut request.rat_types, rat.to_string());
            }
        } else if record.key.starts_with("FreqBandIndicator") {
            if let Some(band) = band() {
                push_unique(&mut request.lte_ca_bands, band);
            }
        } else if record.is_key_family("bandEUTRA") {
            if let Some(band) = band() {
                push_unique(&mut request.lte_mrdc_bands, band);
            }
        } else if record.is_key_family("bandNR") {
            if let Some(band) = band() {
                push_unique(&mut request.nr_mrdc_bands, band);
            }
        }
    }
    log::debug!("capability request: {:?}", request);
    Ok(request)
}

/// Feature names to read for one RAT.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSet {
    /// Features whose value sits on their own line.
    pub single_line: Vec<String>,
    /// Features whose value is the set of their direct children.
    pub nested: Vec<String>,
}

impl FeatureSet {
    fn new(single_line: &[&str], nested: &[&str]) -> Self {
        FeatureSet {
            single_line: single_line.iter().map(|name| name.to_string()).collect(),
            nested: nested.iter().map(|name| name.to_string()).collect(),
        }
    }
}

/// What to extract, per RAT, plus the encoder's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub eutra: FeatureSet,
    pub utra: FeatureSet,
    pub combos: ComboEncoder,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        ExtractionSettings {
            eutra: FeatureSet::new(
                &["accessStratumRelease", "ue-Category", "featureGroupIndicators"],
                &["supportedROHC-Profiles", "phyLayerParameters"],
            ),
            utra: FeatureSet::new(
                &["accessStratumReleaseIndicator", "multiModeCapability"],
                &["pdcp-Capability"],
            ),
            combos: ComboEncoder::default(),
        }
    }
}

/// Features one RAT container declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RatCapability {
    pub fields: FieldMap,
    pub nested: BTreeMap<String, Option<FieldMap>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<String>,
}

/// Everything extracted from one dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityReport {
    pub network: NetworkIdentity,
    pub request: CapabilityRequest,
    pub eutra: Option<RatCapability>,
    pub utra: Option<RatCapability>,
    pub endc_combos: BTreeSet<String>,
}

/// A RAT container cut out of the container list, starting at its `rat-Type` line.
struct RatContainer<'a> {
    rat: String,
    body: Subtree<'a>,
}

fn rat_containers(lines: &[Line]) -> ExtractResult<Vec<RatContainer<'_>>> {
    let mut containers: Vec<RatContainer> = Vec::new();

    for instance in find_instances_containing(lines, CAPABILITY_INFORMATION_MARKER) {
        for block in find_blocks(instance.lines(), CONTAINER_LIST_MARKER) {
            if block.len() < 2 {
                log::debug!(
                    "empty container list at line {}",
                    instance.start() + block.start() + 1
                );
                continue;
            }
            let block = Subtree::new(block.lines(), instance.start() + block.start());

            for entry in partition_siblings(&block)? {
                let Some(offset) = entry
                    .iter()
                    .position(|line| LineRecord::parse(line).key == RAT_TYPE_FIELD)
                else {
                    log::debug!(
                        "container at line {} has no {}",
                        entry.start() + 1,
                        RAT_TYPE_FIELD
                    );
                    continue;
                };
                let body = entry.slice(offset..entry.len());
                if containers.iter().any(|seen| seen.body.lines() == body.lines()) {
                    log::debug!("duplicate RAT container at line {}", body.start() + 1);
                    continue;
                }
                let rat = LineRecord::parse(&body[0])
                    .payload()
                    .unwrap_or_default()
                    .to_string();
                containers.push(RatContainer { rat, body });
            }
        }
    }
    Ok(containers)
}

/// E-UTRA bands the device supports, as `B<n>`.
fn supported_eutra_bands(lines: &[Line]) -> Vec<String> {
    let Some(&position) = find_occurrences(lines, SUPPORTED_BANDS_MARKER).first() else {
        return Vec::new();
    };
    extract_subtree(lines, position)
        .iter()
        .map(LineRecord::parse)
        .filter(|record| record.is_key_family("bandEUTRA"))
        .filter_map(|record| record.payload().map(|band| format!("B{}", band)))
        .collect()
}

/// Extracts a [CapabilityReport] with a given set of features.
#[derive(Debug, Clone, Default)]
pub struct CapabilityExtractor {
    settings: ExtractionSettings,
}

impl CapabilityExtractor {
    pub fn new(settings: ExtractionSettings) -> Self {
        CapabilityExtractor { settings }
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    fn rat_capability(&self, lines: &[Line], features: &FeatureSet) -> RatCapability {
        RatCapability {
            fields: collect_fields(lines, &features.single_line),
            nested: collect_nested_fields(lines, &features.nested),
            bands: Vec::new(),
        }
    }

    pub fn extract(&self, lines: &[Line]) -> ExtractResult<CapabilityReport> {
        for (index, line) in lines.iter().enumerate() {
            line.checked_depth(index)?;
        }

        let network = network_identity(lines);
        let request = capability_request(lines)?;

        let mut eutra = None;
        let mut utra = None;
        for container in rat_containers(lines)? {
            match container.rat.as_str() {
                "eutra" if eutra.is_none() => {
                    let mut capability = self.rat_capability(&container.body, &self.settings.eutra);
                    capability.bands = supported_eutra_bands(&container.body);
                    eutra = Some(capability);
                }
                "utra" if utra.is_none() => {
                    utra = Some(self.rat_capability(&container.body, &self.settings.utra));
                }
                other => log::debug!(
                    "skipping {} container at line {}",
                    other,
                    container.body.start() + 1
                ),
            }
        }

        let endc_combos = match self.settings.combos.endc_combos(lines) {
            Ok(combos) => combos,
            Err(ExtractError::NotFound { marker }) => {
                log::debug!("no EN-DC combinations: {} missing", marker);
                BTreeSet::new()
            }
            Err(err) => return Err(err),
        };

        Ok(CapabilityReport {
            network,
            request,
            eutra,
            utra,
            endc_combos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capscan::testing::lines;

    #[test]
    fn test_network_identity_from_nas() {
        let source = lines(&[
            "Old GUTI or IMSI",
            "  Mobile Country Code: (310)",
            "  Mobile Network Code: (260)",
        ]);
        let identity = network_identity(&source);
        assert_eq!(identity.mcc.as_deref(), Some("310"));
        assert_eq!(identity.mnc.as_deref(), Some("260"));
    }

    #[test]
    fn test_network_identity_from_ims_domain() {
        let source = lines(&["PDN connectivity", "  apn: ims.mnc026.mcc262.3gppnetwork.org"]);
        let identity = network_identity(&source);
        assert_eq!(identity.mcc.as_deref(), Some("262"));
        assert_eq!(identity.mnc.as_deref(), Some("026"));
    }

    #[test]
    fn test_network_identity_unknown() {
        assert_eq!(network_identity(&lines(&["nothing here"])), NetworkIdentity::default());
    }

    #[test]
    fn test_capability_request_deduplicates_in_order() {
        let source = lines(&[
            "ue-CapabilityRequest",
            "  RAT-Type: eutra-nr (7)",
            "  RAT-Type: eutra (0)",
            "requestedFrequencyBands-r11",
            "  FreqBandIndicator-r11: 7",
            "  FreqBandIndicator-r11: 3",
            "",
            "ue-CapabilityRequest",
            "  RAT-Type: eutra (0)",
            "requestedFrequencyBands-r11",
            "  FreqBandIndicator-r11: 3",
            "  FreqBandIndicator-r11: 20",
        ]);
        let request = capability_request(&source).expect("request present");

        assert_eq!(request.rat_types, vec!["eutra-nr", "eutra"]);
        assert_eq!(request.lte_ca_bands, vec![7, 3, 20]);
        assert!(request.nr_mrdc_bands.is_empty());
    }

    #[test]
    fn test_capability_request_missing() {
        let source = lines(&["ueCapabilityInformation", "  rrc-TransactionIdentifier: 1"]);
        assert_eq!(
            capability_request(&source),
            Err(ExtractError::not_found(CAPABILITY_REQUEST_MARKER))
        );
    }

    #[test]
    fn test_duplicate_containers_are_dropped() {
        let source = lines(&[
            "ueCapabilityInformation",
            "  ue-CapabilityRAT-ContainerList",
            "    UE-CapabilityRAT-Container",
            "      rat-Type: eutra (0)",
            "      ue-Category: 4",
            "    UE-CapabilityRAT-Container",
            "      rat-Type: eutra (0)",
            "      ue-Category: 4",
            "    UE-CapabilityRAT-Container",
            "      rat-Type: utra (1)",
            "      multiModeCapability: fdd (1)",
        ]);
        let containers = rat_containers(&source).expect("containers");
        let rats: Vec<&str> = containers.iter().map(|c| c.rat.as_str()).collect();

        assert_eq!(rats, vec!["eutra", "utra"]);
        assert_eq!(containers[1].body.start(), 9);
    }

    #[test]
    fn test_supported_eutra_bands() {
        let source = lines(&[
            "supportedBandListEUTRA",
            "  SupportedBandEUTRA",
            "    bandEUTRA: 2",
            "    halfDuplex: false",
            "  SupportedBandEUTRA",
            "    bandEUTRA: 66",
            "    halfDuplex: false",
        ]);
        assert_eq!(supported_eutra_bands(&source), vec!["B2", "B66"]);
    }

    #[test]
    fn test_header_only_combination_list_gives_no_combos() {
        let source = lines(&[
            "ue-CapabilityRequest",
            "  RAT-Type: eutra-nr (7)",
            "",
            "UECapabilityInformation",
            "  rf-ParametersMRDC",
            "    supportedBandCombinationList",
            "  appliedFeatureFilter",
        ]);
        let report = CapabilityExtractor::default().extract(&source).expect("report");
        assert!(report.endc_combos.is_empty());
    }

    #[test]
    fn test_extract_rejects_binary_lines() {
        let source = lines(&["ue-CapabilityRequest", "  RAT-Type: eutra\u{1}"]);
        let err = CapabilityExtractor::default().extract(&source).unwrap_err();
        assert!(matches!(err, ExtractError::InputEncoding { line: 1, .. }));
    }
}
