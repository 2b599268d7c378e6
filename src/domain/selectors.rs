//! Locators for the Meroshare portal markup.

use crate::domain::ports::Locator;

pub const DEFAULT_LOGIN_URL: &str = "https://meroshare.cdsc.com.np/#/login";

// 登入頁
pub const DP_DROPDOWN: Locator = Locator::Css(".select2-selection__rendered");
pub const DP_SEARCH: Locator = Locator::Css(".select2-search__field");
pub const USERNAME: Locator = Locator::Css("input[name='username']");
pub const PASSWORD: Locator = Locator::Css("input[name='password']");
pub const LOGIN_BUTTON: Locator = Locator::XPath("//button[contains(text(), 'Login')]");
pub const LOGOUT_ICON: Locator = Locator::Css("i.msi.msi-logout.header-menu__icon");

// 導覽
pub const ASBA_LINK: Locator = Locator::XPath("//a[@href='#/asba']");
pub const ASBA_CONTAINER: Locator = Locator::Css(".asba-container");

// 發行列表
pub const OFFER_BLOCK: Locator = Locator::Css(".company-list");
pub const OFFER_COMPANY_NAME: Locator = Locator::Css("span[tooltip='Company Name']");
pub const OFFER_SUB_GROUP: Locator = Locator::Css("span[tooltip='Sub Group']");
pub const OFFER_SHARE_TYPE: Locator = Locator::Css("span[tooltip='Share Type']");
pub const OFFER_SHARE_GROUP: Locator = Locator::Css("span[tooltip='Share Group']");
pub const OFFER_ACTION: Locator = Locator::Css("button.btn-issue");

// 申購表單
pub const BANK_SELECT: Locator = Locator::Css("#selectBank");
pub const ACCOUNT_SELECT: Locator = Locator::Css("#accountNumber");
pub const KITTA_INPUT: Locator = Locator::Css("#appliedKitta");
pub const CRN_INPUT: Locator = Locator::Css("#crnNumber");
pub const DISCLAIMER: Locator = Locator::Css("#disclaimer");
pub const PROCEED_BUTTON: Locator =
    Locator::XPath("//div[contains(@class,'card-footer')]//button[@type='submit']");
pub const PIN_INPUT: Locator = Locator::Css("#transactionPIN");
pub const CONFIRM_APPLY_BUTTON: Locator =
    Locator::XPath("//div[contains(@class,'confirm-page-btn')]//button[@type='submit']");
pub const TOAST_MESSAGE: Locator = Locator::Css(".toast-message");
