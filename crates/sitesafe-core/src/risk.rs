//! Per-section risk aggregation.

use sitesafe_types::{Asset, SectionRisk, SiteSection, Status};

/// Percentage of each section's workers currently in danger.
///
/// One entry per section, in section order. A section without workers
/// has a risk of 0.
pub fn section_risk(assets: &[Asset], sections: &[SiteSection]) -> Vec<SectionRisk> {
    sections
        .iter()
        .map(|section| {
            let workers = assets
                .iter()
                .filter(|a| a.section == section.name && a.asset_type.is_worker());
            let (total, in_danger) = workers.fold((0_u32, 0_u32), |(total, danger), a| {
                let danger = if a.status == Status::Danger {
                    danger.saturating_add(1)
                } else {
                    danger
                };
                (total.saturating_add(1), danger)
            });
            let risk = if total == 0 {
                0.0
            } else {
                f64::from(in_danger) / f64::from(total) * 100.0
            };
            SectionRisk {
                name: section.name.clone(),
                workers: total,
                workers_in_danger: in_danger,
                risk,
            }
        })
        .collect()
}

/// Total number of workers in danger across all sections.
pub fn workers_in_danger(risk: &[SectionRisk]) -> u32 {
    risk.iter()
        .fold(0_u32, |acc, r| acc.saturating_add(r.workers_in_danger))
}

#[cfg(test)]
mod tests {
    use sitesafe_types::{AssetId, AssetType, LatLon, Motion};

    use super::*;

    fn section(name: &str) -> SiteSection {
        SiteSection {
            name: name.to_string(),
            center: LatLon::new(37.545, 127.215),
            zoom: 18,
        }
    }

    fn asset(id: u32, asset_type: AssetType, section: &str, status: Status) -> Asset {
        let here = LatLon::new(37.545, 127.215);
        Asset {
            id: AssetId::new(id),
            name: format!("asset {id}"),
            asset_type,
            position: here,
            motion: Motion::Mobile {
                target_position: here,
            },
            status,
            section: section.to_string(),
        }
    }

    #[test]
    fn risk_is_share_of_workers_in_danger() {
        let assets = vec![
            asset(1, AssetType::Worker, "A", Status::Danger),
            asset(2, AssetType::Worker, "A", Status::Safe),
            asset(3, AssetType::Worker, "A", Status::Safe),
            asset(4, AssetType::Worker, "A", Status::Danger),
            // Equipment never counts, even when flagged.
            asset(5, AssetType::DumpTruck, "A", Status::Danger),
            asset(6, AssetType::Worker, "B", Status::Safe),
        ];
        let risk = section_risk(&assets, &[section("A"), section("B"), section("C")]);

        let a = risk.first().map(|r| (r.workers, r.workers_in_danger, r.risk));
        assert_eq!(a, Some((4, 2, 50.0)));
        let b = risk.get(1).map(|r| (r.workers, r.risk));
        assert_eq!(b, Some((1, 0.0)));
        let c = risk.get(2).map(|r| (r.workers, r.risk));
        assert_eq!(c, Some((0, 0.0)));
        assert_eq!(workers_in_danger(&risk), 2);
    }

    #[test]
    fn risk_follows_section_order() {
        let names: Vec<String> = section_risk(&[], &[section("Z"), section("A")])
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Z", "A"]);
    }
}
