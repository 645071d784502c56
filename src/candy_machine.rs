use anchor_client::solana_sdk::{native_token::LAMPORTS_PER_SOL, pubkey::Pubkey};
use anchor_lang::AccountDeserialize;
use tracing::warn;

use mpl_candy_machine::{
    CandyMachine, CandyMachineData, EndSettingType, WhitelistMintMode, WhitelistMintSettings,
};

use crate::errors::MintError;
use crate::pdas::get_ata_for_mint;
use crate::rpc::ChainClient;

pub use mpl_candy_machine::ID as CANDY_MACHINE_ID;

pub async fn get_candy_machine_state(
    client: &dyn ChainClient,
    candy_machine_id: &Pubkey,
) -> Result<CandyMachine, MintError> {
    let account = client
        .get_account(candy_machine_id)
        .await?
        .ok_or_else(|| MintError::MachineNotFound(candy_machine_id.to_string()))?;

    CandyMachine::try_deserialize(&mut account.data.as_slice())
        .map_err(|_| MintError::InvalidMachineState(candy_machine_id.to_string()))
}

/// What the connected wallet holds, measured in the machine's payment unit.
/// `balance` is lamports for native-currency machines and payment-token base
/// units otherwise.
#[derive(Debug, Default, Clone)]
pub struct WalletStanding {
    pub balance: u64,
    pub whitelist_tokens: u64,
}

/// Candy machine account paired with the address it was read from. The
/// getters mirror what the machine program itself enforces at mint time, so
/// callers can refuse a doomed request before paying fees for it.
pub struct Machine {
    pub id: Pubkey,
    pub state: CandyMachine,
}

impl Machine {
    pub fn new(id: Pubkey, state: CandyMachine) -> Self {
        Self { id, state }
    }

    pub async fn fetch(client: &dyn ChainClient, id: Pubkey) -> Result<Self, MintError> {
        let state = get_candy_machine_state(client, &id).await?;
        Ok(Self { id, state })
    }

    fn data(&self) -> &CandyMachineData {
        &self.state.data
    }

    fn whitelist(&self) -> Option<&WhitelistMintSettings> {
        self.data().whitelist_mint_settings.as_ref()
    }

    /// Redemption cap when the machine ends by count.
    fn end_minted(&self) -> Option<u64> {
        match &self.data().end_settings {
            Some(end) if matches!(end.end_setting_type, EndSettingType::Amount) => Some(end.number),
            _ => None,
        }
    }

    /// Closing timestamp when the machine ends by date.
    fn end_date(&self) -> Option<i64> {
        match &self.data().end_settings {
            Some(end) if matches!(end.end_setting_type, EndSettingType::Date) => {
                Some(end.number as i64)
            }
            _ => None,
        }
    }

    pub fn items_remaining(&self) -> u64 {
        let cap = self
            .end_minted()
            .unwrap_or(u64::MAX)
            .min(self.data().items_available);
        cap.saturating_sub(self.state.items_redeemed)
    }

    pub fn is_sold_out(&self) -> bool {
        self.items_remaining() == 0
    }

    pub fn is_future(&self, now: i64) -> bool {
        matches!(self.data().go_live_date, Some(date) if date > now)
    }

    pub fn has_ended(&self, now: i64) -> bool {
        let by_date = matches!(self.end_date(), Some(date) if date <= now);
        let by_count = matches!(self.end_minted(), Some(cap) if self.state.items_redeemed >= cap);
        by_date || by_count
    }

    pub fn is_live(&self, now: i64) -> bool {
        self.data().go_live_date.is_some()
            && !self.is_future(now)
            && !self.has_ended(now)
            && !self.is_sold_out()
    }

    /// Whitelist holders may mint before the public window opens.
    pub fn is_presale(&self, now: i64) -> bool {
        let presale = self.whitelist().map(|w| w.presale).unwrap_or(false);
        (self.data().go_live_date.is_none() || self.is_future(now)) && presale
    }

    pub fn is_whitelist_only(&self) -> bool {
        self.data().go_live_date.is_none() && self.whitelist().is_some()
    }

    /// Discount price in effect for this wallet, if it holds whitelist tokens.
    pub fn discount(&self, standing: &WalletStanding) -> Option<u64> {
        if standing.whitelist_tokens == 0 {
            return None;
        }
        self.whitelist().and_then(|w| w.discount_price)
    }

    /// Price this wallet would pay per item.
    pub fn unit_price(&self, standing: &WalletStanding) -> u64 {
        self.discount(standing).unwrap_or(self.data().price)
    }

    /// Upper bound on how many items this wallet can still mint, limited by
    /// supply, whitelist holdings and funds.
    pub fn max_available(&self, standing: &WalletStanding) -> u64 {
        let remaining = self.items_remaining();
        let funds_for = |price: u64| {
            if price == 0 {
                u64::MAX
            } else {
                standing.balance / price
            }
        };

        if let Some(discount) = self.discount(standing) {
            remaining
                .min(standing.whitelist_tokens)
                .min(funds_for(discount))
        } else if standing.whitelist_tokens > 0 {
            remaining
                .min(standing.whitelist_tokens)
                .min(funds_for(self.data().price))
        } else {
            remaining.min(funds_for(self.data().price))
        }
    }

    /// Optimistic local increment after confirmed mints; the next refresh
    /// replaces it with the on-chain count.
    pub fn record_redeemed(&mut self, count: u64) {
        self.state.items_redeemed = self.state.items_redeemed.saturating_add(count);
    }

    pub fn price_in_sol(&self) -> f64 {
        self.data().price as f64 / LAMPORTS_PER_SOL as f64
    }
}

/// Reads the wallet's funds and whitelist holdings. Balance problems are not
/// fatal here: a wallet with unreadable balances is reported as holding
/// nothing and the caller decides how far to go.
pub async fn check_wallet(
    client: &dyn ChainClient,
    machine: &Machine,
    wallet: &Pubkey,
) -> WalletStanding {
    let balance = match machine.state.token_mint {
        Some(token_mint) => {
            let ata = get_ata_for_mint(&token_mint, wallet);
            client.get_token_balance(&ata).await
        }
        None => client.get_balance(wallet).await,
    };
    let balance = match balance {
        Ok(balance) => balance,
        Err(err) => {
            warn!("There was a problem fetching the wallet balance: {}", err);
            0
        }
    };

    let whitelist_tokens = match machine.whitelist() {
        Some(settings) => {
            let ata = get_ata_for_mint(&settings.mint, wallet);
            match client.get_token_balance(&ata).await {
                Ok(amount) => amount,
                Err(err) => {
                    warn!(
                        "There was a problem fetching the whitelist balance: {}",
                        err
                    );
                    0
                }
            }
        }
        None => 0,
    };

    WalletStanding {
        balance,
        whitelist_tokens,
    }
}


#[cfg(test)]
mod tests {
    use anchor_lang::AccountSerialize;

    use super::fixtures::*;
    use super::*;
    use crate::rpc::mock::MockChain;

    fn machine(state: CandyMachine) -> Machine {
        Machine::new(Pubkey::new_unique(), state)
    }

    #[test]
    fn items_remaining_is_capped_by_end_settings() {
        let mut state = candy_machine(100);
        state.items_redeemed = 10;
        state.data.end_settings = Some(end_by_amount(40));

        assert_eq!(machine(state).items_remaining(), 30);
    }

    #[test]
    fn items_remaining_never_underflows() {
        let mut state = candy_machine(100);
        state.items_redeemed = 10;
        state.data.end_settings = Some(end_by_amount(5));

        let machine = machine(state);
        assert_eq!(machine.items_remaining(), 0);
        assert!(machine.is_sold_out());
    }

    #[test]
    fn live_window_honors_go_live_date() {
        let mut state = candy_machine(100);
        state.data.go_live_date = Some(1_000);
        let machine = machine(state);

        assert!(machine.is_future(999));
        assert!(!machine.is_live(999));
        assert!(machine.is_live(1_000));
        assert!(machine.is_live(5_000));
    }

    #[test]
    fn machine_without_go_live_date_is_not_live() {
        let mut state = candy_machine(100);
        state.data.go_live_date = None;

        assert!(!machine(state).is_live(1_000));
    }

    #[test]
    fn end_date_closes_the_window() {
        let mut state = candy_machine(100);
        state.data.go_live_date = Some(0);
        state.data.end_settings = Some(end_by_date(2_000));
        let machine = machine(state);

        assert!(!machine.has_ended(1_999));
        assert!(machine.is_live(1_999));
        assert!(machine.has_ended(2_000));
        assert!(!machine.is_live(2_000));
    }

    #[test]
    fn redemption_cap_ends_the_mint() {
        let mut state = candy_machine(100);
        state.items_redeemed = 40;
        state.data.end_settings = Some(end_by_amount(40));

        assert!(machine(state).has_ended(0));
    }

    #[test]
    fn presale_requires_whitelist_flag_before_go_live() {
        let mut state = candy_machine(100);
        state.data.go_live_date = Some(1_000);
        let mut settings = whitelist(WhitelistMintMode::NeverBurn, None);
        settings.presale = true;
        state.data.whitelist_mint_settings = Some(settings);
        let machine = machine(state);

        assert!(machine.is_presale(500));
        assert!(!machine.is_presale(1_500));
    }

    #[test]
    fn whitelist_without_go_live_date_is_whitelist_only() {
        let mut state = candy_machine(100);
        state.data.go_live_date = None;
        state.data.whitelist_mint_settings = Some(whitelist(WhitelistMintMode::NeverBurn, None));

        assert!(machine(state).is_whitelist_only());
    }

    #[test]
    fn discount_applies_only_to_whitelist_holders() {
        let mut state = candy_machine(100);
        state.data.whitelist_mint_settings =
            Some(whitelist(WhitelistMintMode::BurnEveryTime, Some(400)));
        let machine = machine(state);

        let outsider = WalletStanding {
            balance: 10_000,
            whitelist_tokens: 0,
        };
        let holder = WalletStanding {
            balance: 10_000,
            whitelist_tokens: 3,
        };

        assert_eq!(machine.discount(&outsider), None);
        assert_eq!(machine.discount(&holder), Some(400));
        assert_eq!(machine.unit_price(&outsider), 1_000_000);
        assert_eq!(machine.unit_price(&holder), 400);
    }

    #[test]
    fn max_available_is_limited_by_funds() {
        let mut state = candy_machine(100);
        state.data.price = 100;
        let machine = machine(state);

        let standing = WalletStanding {
            balance: 250,
            whitelist_tokens: 0,
        };
        assert_eq!(machine.max_available(&standing), 2);
    }

    #[test]
    fn max_available_is_limited_by_whitelist_holdings() {
        let mut state = candy_machine(100);
        state.data.price = 100;
        state.data.whitelist_mint_settings =
            Some(whitelist(WhitelistMintMode::BurnEveryTime, Some(50)));
        let machine = machine(state);

        let standing = WalletStanding {
            balance: 1_000,
            whitelist_tokens: 3,
        };
        // funds would cover 20 at the discount, but only 3 passes are held
        assert_eq!(machine.max_available(&standing), 3);
    }

    #[test]
    fn free_mint_is_limited_by_supply_alone() {
        let mut state = candy_machine(7);
        state.data.price = 0;
        let machine = machine(state);

        let standing = WalletStanding {
            balance: 0,
            whitelist_tokens: 0,
        };
        assert_eq!(machine.max_available(&standing), 7);
    }

    #[test]
    fn record_redeemed_moves_the_local_count() {
        let mut machine = machine(candy_machine(10));
        machine.record_redeemed(3);

        assert_eq!(machine.state.items_redeemed, 3);
        assert_eq!(machine.items_remaining(), 7);
    }

    #[tokio::test]
    async fn fetches_and_deserializes_machine_account() {
        let state = candy_machine(25);
        let id = Pubkey::new_unique();
        let mut data = Vec::new();
        state.try_serialize(&mut data).unwrap();
        let chain = MockChain::default().with_account(id, data, CANDY_MACHINE_ID);

        let fetched = get_candy_machine_state(&chain, &id).await.unwrap();
        assert_eq!(fetched.data.items_available, 25);
        assert_eq!(fetched.wallet, state.wallet);
    }

    #[tokio::test]
    async fn missing_machine_account_is_reported() {
        let chain = MockChain::default();
        let id = Pubkey::new_unique();

        let err = get_candy_machine_state(&chain, &id).await.unwrap_err();
        assert!(matches!(err, MintError::MachineNotFound(_)));
    }

    #[tokio::test]
    async fn garbage_machine_account_is_reported() {
        let id = Pubkey::new_unique();
        let chain = MockChain::default().with_account(id, vec![0u8; 16], CANDY_MACHINE_ID);

        let err = get_candy_machine_state(&chain, &id).await.unwrap_err();
        assert!(matches!(err, MintError::InvalidMachineState(_)));
    }

    #[tokio::test]
    async fn check_wallet_reads_native_balance_and_whitelist() {
        let wallet = Pubkey::new_unique();
        let mut state = candy_machine(10);
        let settings = whitelist(WhitelistMintMode::NeverBurn, None);
        let whitelist_ata = get_ata_for_mint(&settings.mint, &wallet);
        state.data.whitelist_mint_settings = Some(settings);
        let machine = Machine::new(Pubkey::new_unique(), state);

        let mut chain = MockChain::default();
        chain.balances.insert(wallet, 5_000);
        chain.token_balances.insert(whitelist_ata, 2);

        let standing = check_wallet(&chain, &machine, &wallet).await;
        assert_eq!(standing.balance, 5_000);
        assert_eq!(standing.whitelist_tokens, 2);
    }

    #[tokio::test]
    async fn check_wallet_degrades_to_zero_on_missing_token_accounts() {
        let wallet = Pubkey::new_unique();
        let mut state = candy_machine(10);
        state.token_mint = Some(Pubkey::new_unique());
        state.data.whitelist_mint_settings = Some(whitelist(WhitelistMintMode::NeverBurn, None));
        let machine = Machine::new(Pubkey::new_unique(), state);

        // no token accounts exist on the mock chain
        let standing = check_wallet(&MockChain::default(), &machine, &wallet).await;
        assert_eq!(standing.balance, 0);
        assert_eq!(standing.whitelist_tokens, 0);
    }
}
