// EduLoan 合约绑定
// 合约 ABI 固定，客户端只消费不拥有

use ethers::prelude::abigen;

abigen!(
    EduLoan,
    r#"[
        function applyLoan(uint256 amount, string purpose)
        function makePayment(uint256 loanId) payable
        function approveLoan(uint256 loanId)
        function rejectLoan(uint256 loanId, string reason)
        function disburseLoan(uint256 loanId)
        function depositFunds() payable
        function withdrawFunds(uint256 amount)
        function getLoanDetails(uint256 loanId) view returns (uint256, address, uint256, uint256, uint256, uint256, uint256, uint256, uint256, uint8, string)
        function getMyLoans() view returns (uint256[])
        function getTotalLoans() view returns (uint256)
        function getContractBalance() view returns (uint256)
        function getRemainingAmount(uint256 loanId) view returns (uint256)
        function getApprovalTime(uint256 loanId) view returns (uint256)
        function calculateInterest(uint256 amount) view returns (uint256)
        function admin() view returns (address)
    ]"#
);
