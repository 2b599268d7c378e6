use crate::domain::model::Offer;
use crate::domain::ports::{Locator, PortalDriver};
use crate::domain::selectors;
use crate::utils::error::{PortalError, Result, Step};
use std::time::Duration;

const OFFER_FIELDS: [Locator; 5] = [
    selectors::OFFER_COMPANY_NAME,
    selectors::OFFER_SUB_GROUP,
    selectors::OFFER_SHARE_TYPE,
    selectors::OFFER_SHARE_GROUP,
    selectors::OFFER_ACTION,
];

/// Reads the offer blocks of the ASBA listing.
pub struct OfferLister<'a, D: PortalDriver + ?Sized> {
    driver: &'a D,
    timeout: Duration,
}

impl<'a, D: PortalDriver + ?Sized> OfferLister<'a, D> {
    pub fn new(driver: &'a D, timeout: Duration) -> Self {
        Self { driver, timeout }
    }

    /// Every offer block on the current page, eligible or not.
    pub async fn list(&self) -> Result<Vec<Offer>> {
        self.read().await.map_err(|e| {
            tracing::error!("Failed to list offers: {}", e);
            e.during(Step::ListOffers)
        })
    }

    async fn read(&self) -> Result<Vec<Offer>> {
        // 沒有開放中的發行時頁面不會出現任何區塊
        match self
            .driver
            .wait_for(selectors::OFFER_BLOCK, self.timeout)
            .await
        {
            Ok(()) => {}
            Err(PortalError::ElementTimeout { .. }) => {
                tracing::info!("No offer blocks found on the ASBA page");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        }

        let rows = self
            .driver
            .read_blocks(selectors::OFFER_BLOCK, &OFFER_FIELDS)
            .await?;

        let offers: Vec<Offer> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, fields)| offer_from_fields(index, fields))
            .collect();

        tracing::debug!("Read {} offer blocks", offers.len());
        Ok(offers)
    }
}

fn offer_from_fields(index: usize, fields: Vec<Option<String>>) -> Option<Offer> {
    let mut fields = fields.into_iter();
    let mut next = || fields.next().flatten();

    let company_name = match next() {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => {
            tracing::debug!("Skipping offer block {} without a company name", index);
            return None;
        }
    };

    Some(Offer {
        index,
        company_name,
        sub_group: next(),
        share_type: next().unwrap_or_default(),
        share_group: next().unwrap_or_default(),
        action: next(),
    })
}

/// 篩選可申購的普通股 IPO，保留原始順序
pub fn eligible(offers: &[Offer]) -> Vec<Offer> {
    offers
        .iter()
        .filter(|offer| offer.is_eligible())
        .cloned()
        .collect()
}

pub fn find_by_name<'o>(offers: &'o [Offer], name: &str) -> Option<&'o Offer> {
    offers
        .iter()
        .find(|offer| offer.is_eligible() && offer.matches_name(name))
}

/// 重新讀取列表後找回同一筆發行（同公司可能有多個子群組）
pub fn find_same<'o>(offers: &'o [Offer], target: &Offer) -> Option<&'o Offer> {
    offers.iter().find(|offer| offer.is_same_issue(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    fn offer(index: usize, name: &str, share_type: &str, share_group: &str) -> Offer {
        Offer {
            index,
            company_name: name.to_string(),
            sub_group: None,
            share_type: share_type.to_string(),
            share_group: share_group.to_string(),
            action: Some("Apply".to_string()),
        }
    }

    #[test]
    fn test_offer_from_fields() {
        let parsed = offer_from_fields(
            3,
            fields(&[
                Some(" XYZ Hydropower "),
                Some("For General Public"),
                Some("IPO"),
                Some("Ordinary Shares"),
                Some("Apply"),
            ]),
        )
        .unwrap();

        assert_eq!(parsed.index, 3);
        assert_eq!(parsed.company_name, "XYZ Hydropower");
        assert_eq!(parsed.sub_group.as_deref(), Some("For General Public"));
        assert!(parsed.is_eligible());
        assert!(parsed.can_apply());
    }

    #[test]
    fn test_block_without_name_is_skipped() {
        assert!(offer_from_fields(0, fields(&[None, None, Some("IPO"), None, None])).is_none());
        assert!(offer_from_fields(0, fields(&[Some("  ")])).is_none());
    }

    #[test]
    fn test_short_rows_fill_defaults() {
        let parsed = offer_from_fields(1, fields(&[Some("ABC Bank Limited")])).unwrap();
        assert_eq!(parsed.share_type, "");
        assert_eq!(parsed.action, None);
        assert!(!parsed.is_eligible());
    }

    #[test]
    fn test_eligible_preserves_order() {
        let offers = vec![
            offer(0, "ABC Bank Limited", "IPO", "Ordinary Shares"),
            offer(1, "Some Debenture", "IPO", "Debentures"),
            offer(2, "Right Share Co", "RIGHT", "Ordinary Shares"),
            offer(3, "XYZ Hydropower", "IPO", "Ordinary Shares"),
        ];

        let names: Vec<String> = eligible(&offers)
            .into_iter()
            .map(|o| o.company_name)
            .collect();
        assert_eq!(names, vec!["ABC Bank Limited", "XYZ Hydropower"]);
    }

    #[test]
    fn test_find_by_name_only_matches_eligible() {
        let offers = vec![
            offer(0, "Some Debenture", "IPO", "Debentures"),
            offer(1, "XYZ Hydropower", "IPO", "Ordinary Shares"),
        ];

        assert_eq!(find_by_name(&offers, "xyz hydropower").map(|o| o.index), Some(1));
        assert!(find_by_name(&offers, "Some Debenture").is_none());
        assert!(find_by_name(&offers, "Unknown").is_none());
    }

    #[test]
    fn test_find_same_tells_sub_groups_apart() {
        let mut general = offer(0, "ABC Hydro", "IPO", "Ordinary Shares");
        general.sub_group = Some("For General Public".to_string());
        let mut local = offer(1, "ABC Hydro", "IPO", "Ordinary Shares");
        local.sub_group = Some("For Local People".to_string());
        let listing = vec![general, local.clone()];

        let mut target = local;
        target.index = 5;
        assert_eq!(find_same(&listing, &target).map(|o| o.index), Some(1));

        target.sub_group = Some("For Foreign Employment".to_string());
        assert!(find_same(&listing, &target).is_none());
    }
}
