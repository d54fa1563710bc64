//! Circulation service: issue, return and renew copies

use chrono::{Duration, Local, NaiveDate};
use uuid::Uuid;

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::{
        book_instance::{BookInstance, BookInstanceShort, LoanStatus},
        loan::{IssueChoices, IssueRequest, LoanView, RenewRequest, RenewalProposal, ReturnReceipt},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: CirculationConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: CirculationConfig) -> Self {
        Self { repository, config }
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    /// Users and available copies offered by the issue form
    pub async fn issue_choices(&self) -> AppResult<IssueChoices> {
        let users = self.repository.users_list_short().await?;
        let instances = self.repository.instances_by_status(LoanStatus::Available).await?;
        Ok(IssueChoices { users, instances })
    }

    /// Lend an available copy to a user for the loan period
    pub async fn issue(&self, request: &IssueRequest) -> AppResult<BookInstance> {
        let borrower = self.repository.users_get_by_id(request.user_id).await?;
        let mut instance = self.repository.instances_get_by_id(request.instance_id).await?;

        if instance.status != LoanStatus::Available {
            return Err(AppError::Conflict(format!(
                "Book instance {} is not available ({})",
                instance.id, instance.status
            )));
        }

        instance.issue(borrower.id, self.today(), self.config.loan_period_days);

        let issued = self
            .repository
            .loans_issue(&instance)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!("Book instance {} was issued concurrently", instance.id))
            })?;

        tracing::info!(
            instance = %issued.id,
            borrower = %borrower.username,
            due_back = ?issued.due_back,
            "Book issued"
        );

        Ok(issued)
    }

    /// Copies that can be returned
    pub async fn return_candidates(&self) -> AppResult<Vec<BookInstanceShort>> {
        let today = self.today();
        let instances = self.repository.instances_by_status(LoanStatus::OnLoan).await?;
        Ok(instances.into_iter().map(|i| i.with_overdue(today)).collect())
    }

    /// Take a copy back today and charge any overdue fee to its borrower
    pub async fn return_book(&self, instance_id: Uuid) -> AppResult<ReturnReceipt> {
        let receipt = self
            .repository
            .loans_return(instance_id, self.today(), self.config.daily_fee())
            .await?;

        tracing::info!(
            instance = %instance_id,
            fee = %receipt.fee,
            outstanding_debt = ?receipt.outstanding_debt,
            "Book returned"
        );

        Ok(receipt)
    }

    /// Renewal form contents for a copy
    pub async fn renewal_proposal(&self, instance_id: Uuid) -> AppResult<RenewalProposal> {
        let instance = self.repository.instances_get_by_id(instance_id).await?;
        let today = self.today();
        Ok(RenewalProposal {
            instance,
            proposed_renewal_date: today + Duration::days(self.config.default_renewal_days),
            latest_renewal_date: today + Duration::days(self.config.renewal_window_days),
        })
    }

    /// Move a copy's due date within the renewal window
    pub async fn renew(&self, instance_id: Uuid, request: &RenewRequest) -> AppResult<BookInstance> {
        // 404 before form errors
        self.repository.instances_get_by_id(instance_id).await?;

        request.validate_window(self.today(), self.config.renewal_window_days)?;

        let instance = self
            .repository
            .loans_renew(instance_id, request.renewal_date)
            .await?;

        tracing::info!(instance = %instance_id, due_back = %request.renewal_date, "Book renewed");

        Ok(instance)
    }

    /// Copies on loan to the given user
    pub async fn loans_for_user(&self, user_id: i32) -> AppResult<Vec<BookInstanceShort>> {
        let today = self.today();
        let loans = self.repository.loans_for_borrower(user_id).await?;
        Ok(loans.into_iter().map(|l| l.with_overdue(today)).collect())
    }

    /// Every copy on loan
    pub async fn all_loans(&self) -> AppResult<Vec<LoanView>> {
        let today = self.today();
        let loans = self.repository.loans_list_all().await?;
        Ok(loans.into_iter().map(|l| l.with_overdue(today)).collect())
    }
}
